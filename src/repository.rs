use std::path::PathBuf;

use jiff::civil::Date;
use thiserror::Error;

use crate::{
    models::project::Project,
    report,
    storage::{
        Storage, StorageError,
        codec::{self, FormatError},
    },
};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Project store line {line_number} is malformed: {source}")]
    Malformed {
        line_number: usize,
        #[source]
        source: FormatError,
    },

    #[error("Project cannot be stored: {0}")]
    Encode(#[from] FormatError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Ordered in-memory collection of projects mirrored to a [`Storage`].
///
/// Insertion order is kept and duplicate job numbers are not rejected here;
/// lookups return the first match. Nothing is persisted until [`save_all`]
/// is called.
///
/// [`save_all`]: ProjectRepository::save_all
#[derive(Debug, Default)]
pub struct ProjectRepository {
    projects: Vec<Project>,
}

impl ProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode every non-blank store line, in file order.
    ///
    /// A missing or unreadable store yields an empty repository. A store that
    /// is not text, or holds any malformed line, fails the whole load so its
    /// records are never overwritten.
    pub fn load_all(storage: &impl Storage) -> Result<Self, RepositoryError> {
        let content = match storage.read() {
            Ok(Some(content)) => content,
            Ok(None) => {
                tracing::info!("No existing project store found, starting empty");
                return Ok(Self::new());
            }
            Err(e @ StorageError::Corrupt { .. }) => {
                tracing::error!(error = %e, "Project store is corrupt");
                return Err(e.into());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Project store unavailable, starting empty");
                return Ok(Self::new());
            }
        };

        let mut projects = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let project = codec::decode_line(line).map_err(|source| {
                tracing::error!(line_number = index + 1, error = %source, "Malformed project line");
                RepositoryError::Malformed {
                    line_number: index + 1,
                    source,
                }
            })?;
            projects.push(project);
        }

        tracing::debug!(count = projects.len(), "Loaded projects");
        Ok(Self { projects })
    }

    /// Encode the whole collection, one line per project in collection order.
    pub fn encode_all(&self) -> Result<String, FormatError> {
        let mut content = String::new();
        for project in &self.projects {
            content.push_str(&codec::encode_line(project)?);
            content.push('\n');
        }
        Ok(content)
    }

    /// Overwrite the store with the current collection. On failure the
    /// in-memory state stays authoritative and the store is left as it was.
    pub fn save_all(&self, storage: &impl Storage) -> Result<(), RepositoryError> {
        let content = self.encode_all()?;
        storage.write(&content).inspect_err(|e| {
            tracing::warn!(error = %e, "Project store not updated, latest changes are not durable");
        })?;
        tracing::debug!(count = self.projects.len(), "Saved projects");
        Ok(())
    }

    pub fn append(&mut self, project: Project) {
        self.projects.push(project);
    }

    pub fn find_by_job_number(&self, job_number: u32) -> Option<&Project> {
        self.projects.iter().find(|p| p.job_number == job_number)
    }

    pub fn find_by_job_number_mut(&mut self, job_number: u32) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.job_number == job_number)
    }

    /// First project whose contractor name matches exactly (case-sensitive).
    pub fn find_by_contractor_name(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.contractor.name == name)
    }

    pub fn find_by_contractor_name_mut(&mut self, name: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.contractor.name == name)
    }

    /// Write the finalized report of `project`. Reports are never read back.
    pub fn export_finalized(
        storage: &impl Storage,
        project: &Project,
        completed_on: Date,
    ) -> Result<PathBuf, RepositoryError> {
        let report = report::finalized(project, completed_on);
        let path = storage.write_report(project.job_number, &report)?;
        tracing::info!(job_number = project.job_number, path = %path.display(), "Exported finalized report");
        Ok(path)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
