//! Storage error types

use std::path::PathBuf;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create storage directory {path}: {source}")]
    DirectoryUncreatable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read storage directory {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File exceeds the {limit_bytes} byte limit")]
    FileTooLarge { limit_bytes: u64 },

    #[error("Upload stream failed: {0}")]
    StreamFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Could not allocate a unique filename after {0} attempts")]
    NamesExhausted(usize),

    #[error("Invalid filename: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
