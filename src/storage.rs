use std::path::PathBuf;

use thiserror::Error;

pub mod codec;
pub mod flat_file;
#[cfg(test)]
pub mod memory;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read project store '{path}': {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Project store '{path}' is not valid UTF-8 text: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save project store to '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write project report '{path}': {source}")]
    ReportFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Backing store for the project repository: one text document of project
/// lines, plus write-only per-project reports.
pub trait Storage {
    /// Raw store contents, `Ok(None)` when no store exists yet.
    fn read(&self) -> Result<Option<String>, StorageError>;
    /// Replace the whole store with `contents`.
    fn write(&self, contents: &str) -> Result<(), StorageError>;
    /// Write the finalized report of `job_number`, returning where it went.
    fn write_report(&self, job_number: u32, report: &str) -> Result<PathBuf, StorageError>;
}
