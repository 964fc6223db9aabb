//! Directory storage error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors reading or writing the persisted app directory
#[derive(Debug, Error)]
pub enum StorageError {
    /// The directory document exists but could not be read
    #[error("Failed to read app directory {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory document exists but is not valid
    #[error("App directory {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The directory document could not be written
    #[error("Failed to write app directory {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for directory operations
pub type Result<T> = std::result::Result<T, StorageError>;
