//! Durable storage for validated uploads
//!
//! Storage backends receive files only after a batch validated every one of
//! them. The crate ships two filesystem backends:
//!
//! - [`FileSystemStorage`]: moves each file into a directory under its own
//!   sanitized name, optionally refusing to overwrite
//! - [`HashedFileSystemStorage`]: same, but renames each file to a random
//!   hash first
//!
//! Other destinations (object storage, databases) only need to implement
//! [`StorageBackend`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use acton_upload::file::FileInfo;
//! use acton_upload::intake::TempDirChannel;
//! use acton_upload::storage::{FileSystemStorage, StorageBackend};
//! use std::sync::Arc;
//!
//! # fn example() -> anyhow::Result<()> {
//! let storage = FileSystemStorage::new("/var/uploads", false)?;
//!
//! let channel = Arc::new(TempDirChannel::new("/tmp"));
//! let mut file = FileInfo::new("/tmp/phpA1b2", Some("report.pdf"), channel);
//!
//! let stored = storage.store(&mut file)?;
//! println!("Stored at: {}", stored.storage_path.display());
//! # Ok(())
//! # }
//! ```

mod hashed;
mod local;
mod traits;
mod types;

pub use hashed::HashedFileSystemStorage;
pub use local::FileSystemStorage;
#[cfg(test)]
pub use traits::MockStorageBackend;
pub use traits::StorageBackend;
pub use types::{StorageError, StorageResult, StoredFile};
