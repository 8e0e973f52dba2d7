//! Storage backend trait definitions

use super::types::{StorageResult, StoredFile};
use crate::file::FileInfo;
use std::sync::Arc;

/// Persists validated uploads
///
/// A backend receives each file of a batch after validation succeeded, in
/// submission order. It may rewrite the file's name before persisting it
/// (see [`HashedFileSystemStorage`](super::HashedFileSystemStorage)).
///
/// Any type implementing this trait can replace the filesystem backends
/// without touching [`UploadBatch`](crate::upload::UploadBatch).
///
/// # Examples
///
/// ```rust
/// use acton_upload::file::FileInfo;
/// use acton_upload::storage::{StorageBackend, StorageError, StorageResult, StoredFile};
///
/// /// Refuses everything, handy while storage is in maintenance
/// struct ReadOnly;
///
/// impl StorageBackend for ReadOnly {
///     fn store(&self, _file: &mut FileInfo) -> StorageResult<StoredFile> {
///         Err(StorageError::Other("storage is read-only".to_string()))
///     }
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait StorageBackend: Send + Sync {
    /// Moves `file` from its temp location to durable storage
    ///
    /// # Errors
    ///
    /// Returns an error if the destination is taken (and overwriting is
    /// disabled) or the file cannot be moved.
    fn store(&self, file: &mut FileInfo) -> StorageResult<StoredFile>;
}

impl<T: StorageBackend + ?Sized> StorageBackend for &T {
    fn store(&self, file: &mut FileInfo) -> StorageResult<StoredFile> {
        (**self).store(file)
    }
}

impl<T: StorageBackend + ?Sized> StorageBackend for Box<T> {
    fn store(&self, file: &mut FileInfo) -> StorageResult<StoredFile> {
        (**self).store(file)
    }
}

impl<T: StorageBackend + ?Sized> StorageBackend for Arc<T> {
    fn store(&self, file: &mut FileInfo) -> StorageResult<StoredFile> {
        (**self).store(file)
    }
}
