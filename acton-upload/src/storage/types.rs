//! Core types for file storage

use crate::error::MessageTemplate;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting a file
#[derive(Debug, Error)]
pub enum StorageError {
    /// The target directory does not exist
    #[error("Directory does not exist")]
    DirectoryMissing(PathBuf),

    /// The target directory cannot be written to
    #[error("Directory is not writable")]
    DirectoryNotWritable(PathBuf),

    /// The file has neither a name nor an extension
    #[error("File name is empty")]
    EmptyName,

    /// The destination is taken and overwriting is disabled
    #[error("File already exists")]
    AlreadyExists {
        /// Name of the file being stored
        file: String,
        /// Occupied destination
        destination: PathBuf,
    },

    /// The temp file could not be moved into place
    #[error("File could not be moved to final destination.")]
    MoveFailed {
        /// Name of the file being stored
        file: String,
        /// Underlying failure
        source: io::Error,
    },

    /// I/O error during a storage operation
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure reported by a custom backend
    #[error("Storage error: {0}")]
    Other(String),
}

impl StorageError {
    /// Describes this error as a translatable template
    #[must_use]
    pub fn template(&self) -> MessageTemplate {
        match self {
            Self::DirectoryMissing(_) => MessageTemplate::new("Directory does not exist"),
            Self::DirectoryNotWritable(_) => MessageTemplate::new("Directory is not writable"),
            Self::EmptyName => MessageTemplate::new("File name is empty"),
            Self::AlreadyExists { .. } => MessageTemplate::new("File already exists"),
            Self::MoveFailed { .. } => {
                MessageTemplate::new("File could not be moved to final destination.")
            }
            Self::Io(err) => MessageTemplate::with_params("I/O error: %s", [err]),
            Self::Other(reason) => MessageTemplate::with_params("Storage error: %s", [reason]),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Where a file ended up
///
/// # Examples
///
/// ```rust
/// use acton_upload::storage::StoredFile;
/// use std::path::PathBuf;
///
/// let stored = StoredFile {
///     filename: "avatar.png".to_string(),
///     storage_path: PathBuf::from("/var/uploads/avatar.png"),
/// };
/// assert_eq!(stored.storage_path.file_name().unwrap(), "avatar.png");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Final file name, extension included
    pub filename: String,

    /// Location of the stored file
    pub storage_path: PathBuf,
}
