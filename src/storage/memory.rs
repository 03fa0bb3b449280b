use std::{cell::RefCell, path::PathBuf};

use crate::storage::{Storage, StorageError};

/// In-memory store for exercising the repository and services.
#[derive(Default)]
pub struct MemoryStorage {
    pub contents: RefCell<Option<String>>,
    pub reports: RefCell<Vec<(u32, String)>>,
    pub unreadable: bool,
    pub corrupt: bool,
    pub read_only: bool,
}

impl MemoryStorage {
    pub fn with_contents(contents: &str) -> Self {
        Self {
            contents: RefCell::new(Some(contents.to_string())),
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

fn denied() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied")
}

impl Storage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        if self.corrupt {
            return Err(StorageError::Corrupt {
                path: PathBuf::from("<memory>"),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, "not utf-8"),
            });
        }
        if self.unreadable {
            return Err(StorageError::LoadFailed {
                path: PathBuf::from("<memory>"),
                source: denied(),
            });
        }
        Ok(self.contents.borrow().clone())
    }

    fn write(&self, contents: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::SaveFailed {
                path: PathBuf::from("<memory>"),
                source: denied(),
            });
        }
        *self.contents.borrow_mut() = Some(contents.to_string());
        Ok(())
    }

    fn write_report(&self, job_number: u32, report: &str) -> Result<PathBuf, StorageError> {
        if self.read_only {
            return Err(StorageError::ReportFailed {
                path: PathBuf::from("<memory>"),
                source: denied(),
            });
        }
        self.reports
            .borrow_mut()
            .push((job_number, report.to_string()));
        Ok(PathBuf::from(format!("Completed project {job_number}.txt")))
    }
}
