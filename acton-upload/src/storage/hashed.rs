//! Filesystem storage with unguessable file names

use super::local::FileSystemStorage;
use super::traits::StorageBackend;
use super::types::{StorageResult, StoredFile};
use crate::file::FileInfo;
use chrono::Utc;
use md5::{Digest, Md5};
use std::path::{Path, PathBuf};

/// [`FileSystemStorage`] that renames every file to a random hash first
///
/// The new name is the MD5 of the current time, the original name, and a
/// random number; the extension is kept. Stored names neither collide in
/// practice nor reveal the client's file name.
///
/// # Examples
///
/// ```rust,no_run
/// use acton_upload::storage::HashedFileSystemStorage;
///
/// # fn example() -> acton_upload::storage::StorageResult<()> {
/// let storage = HashedFileSystemStorage::new("/var/uploads", false)?;
/// // "holiday.jpg" ends up as e.g. "3f2a...9c1d.jpg"
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HashedFileSystemStorage {
    inner: FileSystemStorage,
}

impl HashedFileSystemStorage {
    /// Creates a backend storing into `directory`
    ///
    /// # Errors
    ///
    /// Fails like [`FileSystemStorage::new`].
    pub fn new(directory: impl Into<PathBuf>, overwrite: bool) -> StorageResult<Self> {
        FileSystemStorage::new(directory, overwrite).map(Self::from)
    }

    /// Target directory
    #[must_use]
    pub fn directory(&self) -> &Path {
        self.inner.directory()
    }

    /// The wrapped backend
    #[must_use]
    pub const fn inner(&self) -> &FileSystemStorage {
        &self.inner
    }
}

impl From<FileSystemStorage> for HashedFileSystemStorage {
    fn from(inner: FileSystemStorage) -> Self {
        Self { inner }
    }
}

impl StorageBackend for HashedFileSystemStorage {
    fn store(&self, file: &mut FileInfo) -> StorageResult<StoredFile> {
        let original = file.name().to_string();
        let hashed = hashed_name(&original);
        tracing::debug!(from = %original, to = %hashed, "Hashing upload name");
        file.set_name(&hashed);

        // Errors are reported against the client's name, not the hash
        self.inner.store(file).inspect_err(|_| {
            file.set_name(&original);
        })
    }
}

fn hashed_name(name: &str) -> String {
    let now = Utc::now();
    let seed = format!(
        "{}{}{name}{:016x}",
        now.timestamp(),
        now.timestamp_subsec_nanos(),
        rand::random::<u64>()
    );
    hex::encode(Md5::digest(seed.as_bytes()))
}
