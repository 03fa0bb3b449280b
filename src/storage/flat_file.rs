use std::{
    fs::{self, OpenOptions, rename},
    io::Write,
    path::{Path, PathBuf},
};

use fs2::FileExt;
use uuid::Uuid;

use crate::storage::{Storage, StorageError};

pub struct FlatFileStorage {
    path: PathBuf,
    reports_dir: PathBuf,
}

impl FlatFileStorage {
    pub fn new(path: PathBuf, reports_dir: PathBuf) -> Self {
        Self { path, reports_dir }
    }

    /// Storage keeping reports next to the store file.
    pub fn beside_store(path: PathBuf) -> Self {
        let reports_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        Self::new(path, reports_dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn report_path(&self, job_number: u32) -> PathBuf {
        self.reports_dir
            .join(format!("Completed project {job_number}.txt"))
    }

    fn write_temp(&self, contents: &str) -> Result<PathBuf, StorageError> {
        let temp_path = PathBuf::from(format!("{}.tmp.{}", self.path.display(), Uuid::new_v4()));
        let save_failed = |source: std::io::Error| StorageError::SaveFailed {
            path: temp_path.clone(),
            source,
        };

        let mut file = fs::File::create(&temp_path).map_err(save_failed)?;
        let written = file
            .write_all(contents.as_bytes())
            .and_then(|()| file.sync_all());
        // Closed before the rename or the cleanup below.
        drop(file);

        discard_on_error(written, &temp_path).map_err(save_failed)?;

        Ok(temp_path)
    }
}

/// Remove the temp file when `result` failed, so no `*.tmp.*` file outlives a failed save.
fn discard_on_error<T>(result: std::io::Result<T>, temp_path: &Path) -> std::io::Result<T> {
    if result.is_err() {
        let _ = fs::remove_file(temp_path);
    }
    result
}

impl Storage for FlatFileStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => Err(StorageError::Corrupt {
                path: self.path.clone(),
                source: e,
            }),
            Err(e) => Err(StorageError::LoadFailed {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn write(&self, contents: &str) -> Result<(), StorageError> {
        let temp_path = self.write_temp(contents)?;

        let lock_file_path = self.path.with_extension("lock");
        let lock_file = discard_on_error(
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(false)
                .open(&lock_file_path),
            &temp_path,
        )
        .map_err(|e| StorageError::SaveFailed {
            path: lock_file_path.clone(),
            source: e,
        })?;
        discard_on_error(lock_file.lock_exclusive(), &temp_path).map_err(|e| {
            StorageError::SaveFailed {
                path: lock_file_path,
                source: e,
            }
        })?;

        discard_on_error(rename(&temp_path, &self.path), &temp_path).map_err(|e| {
            StorageError::SaveFailed {
                path: self.path.clone(),
                source: e,
            }
        })?;

        lock_file.unlock().map_err(|e| StorageError::SaveFailed {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(())
    }

    fn write_report(&self, job_number: u32, report: &str) -> Result<PathBuf, StorageError> {
        let report_path = self.report_path(job_number);
        fs::write(&report_path, report).map_err(|e| StorageError::ReportFailed {
            path: report_path.clone(),
            source: e,
        })?;
        Ok(report_path)
    }
}
