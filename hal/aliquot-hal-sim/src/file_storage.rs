//! File-backed tip-count storage
//!
//! Keeps the record as a small text file on the robot's data partition.
//! The directory and an initial `0, 0` record are created on demand.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use aliquot_hal::storage::{copy_first_line, INITIAL_RECORD};
use aliquot_hal::{StorageError, TipCountStorage};
use log::{debug, warn};
use thiserror::Error;

/// Where the robot keeps the record
pub const DEFAULT_RECORD_PATH: &str = "/data/csv/tiptracking.csv";

/// Errors from file operations, with the path involved
#[derive(Debug, Error)]
pub enum FileStorageError {
    #[error("failed to create record directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read tip record {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write tip record {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileStorageError {
    /// Collapse into the HAL error kind
    pub fn kind(&self) -> StorageError {
        match self {
            FileStorageError::Read { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                StorageError::NotFound
            }
            _ => StorageError::Io,
        }
    }
}

/// Tip-count record stored in a file
#[derive(Debug, Clone)]
pub struct FileTipStorage {
    path: PathBuf,
}

impl Default for FileTipStorage {
    fn default() -> Self {
        Self::new(DEFAULT_RECORD_PATH)
    }
}

impl FileTipStorage {
    /// Storage at a given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Record file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory and initial record if missing
    ///
    /// Returns true if a new record was written.
    pub fn initialize(&self) -> Result<bool, FileStorageError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|source| FileStorageError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
        }

        if self.path.is_file() {
            return Ok(false);
        }

        self.store(INITIAL_RECORD)?;
        Ok(true)
    }

    /// Read the whole record
    pub fn load(&self) -> Result<Vec<u8>, FileStorageError> {
        fs::read(&self.path).map_err(|source| FileStorageError::Read {
            path: self.path.clone(),
            source,
        })
    }

    fn store(&self, data: &[u8]) -> Result<(), FileStorageError> {
        fs::write(&self.path, data).map_err(|source| FileStorageError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn report(e: FileStorageError) -> StorageError {
    warn!("{}: {}", e, io_cause(&e));
    e.kind()
}

fn io_cause(e: &FileStorageError) -> &io::Error {
    match e {
        FileStorageError::CreateDir { source, .. }
        | FileStorageError::Read { source, .. }
        | FileStorageError::Write { source, .. } => source,
    }
}

impl TipCountStorage for FileTipStorage {
    fn ensure_initialized(&mut self) -> Result<(), StorageError> {
        if self.initialize().map_err(report)? {
            debug!("Created tip record at {}", self.path.display());
        }
        Ok(())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let data = self.load().map_err(report)?;
        copy_first_line(&data, buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_in(dir: &TempDir) -> FileTipStorage {
        FileTipStorage::new(dir.path().join("data").join("csv").join("tiptracking.csv"))
    }

    #[test]
    fn test_creates_directory_and_record() {
        let dir = TempDir::new().unwrap();
        let mut storage = storage_in(&dir);
        assert!(!storage.path().exists());

        storage.ensure_initialized().unwrap();

        assert_eq!(fs::read_to_string(storage.path()).unwrap(), "0, 0\n");
    }

    #[test]
    fn test_keeps_existing_record() {
        let dir = TempDir::new().unwrap();
        let mut storage = storage_in(&dir);
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), "12, 34\n").unwrap();

        assert!(!storage.initialize().unwrap());
        storage.ensure_initialized().unwrap();

        let mut buffer = [0u8; 64];
        let len = storage.read(&mut buffer).unwrap();
        assert_eq!(&buffer[..len], b"12, 34\n");
    }

    #[test]
    fn test_read_returns_first_line() {
        let dir = TempDir::new().unwrap();
        let mut storage = storage_in(&dir);
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), format!("12, 34\n{}\n", "#".repeat(80))).unwrap();

        let mut buffer = [0u8; 64];
        let len = storage.read(&mut buffer).unwrap();

        assert_eq!(&buffer[..len], b"12, 34\n");
        assert_eq!(storage.load().unwrap().len(), 88);
    }

    #[test]
    fn test_read_missing_record() {
        let dir = TempDir::new().unwrap();
        let mut storage = storage_in(&dir);

        let mut buffer = [0u8; 64];
        assert_eq!(storage.read(&mut buffer), Err(StorageError::NotFound));
    }

    #[test]
    fn test_read_buffer_too_small() {
        let dir = TempDir::new().unwrap();
        let mut storage = storage_in(&dir);
        storage.ensure_initialized().unwrap();

        let mut buffer = [0u8; 2];
        assert_eq!(storage.read(&mut buffer), Err(StorageError::BufferTooSmall));
    }

    #[test]
    fn test_error_mentions_path() {
        let storage = FileTipStorage::new("/nonexistent-aliquot-dir/tiptracking.csv");

        let err = storage.load().unwrap_err();

        assert_eq!(err.kind(), StorageError::NotFound);
        assert!(err.to_string().contains("/nonexistent-aliquot-dir/tiptracking.csv"));
    }
}
