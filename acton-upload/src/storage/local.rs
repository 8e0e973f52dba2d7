//! Local filesystem storage implementation

use super::traits::StorageBackend;
use super::types::{StorageError, StorageResult, StoredFile};
use crate::file::{sanitize_name, FileInfo};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Moves uploads into one local directory
///
/// Files keep their (sanitized) name and extension. When `overwrite` is
/// disabled an existing destination is never replaced and the temp file is
/// left untouched.
///
/// # Examples
///
/// ```rust,no_run
/// use acton_upload::storage::FileSystemStorage;
///
/// # fn example() -> acton_upload::storage::StorageResult<()> {
/// // Fails right away if /var/uploads is missing or read-only
/// let storage = FileSystemStorage::new("/var/uploads", false)?;
/// assert!(!storage.overwrite());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    directory: PathBuf,
    overwrite: bool,
}

impl FileSystemStorage {
    /// Creates a backend storing into `directory`
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::DirectoryMissing`] if `directory` is not an
    /// existing directory and [`StorageError::DirectoryNotWritable`] if a
    /// file cannot be created in it.
    pub fn new(directory: impl Into<PathBuf>, overwrite: bool) -> StorageResult<Self> {
        let directory = directory.into();

        if !directory.is_dir() {
            return Err(StorageError::DirectoryMissing(directory));
        }
        if !is_writable(&directory) {
            return Err(StorageError::DirectoryNotWritable(directory));
        }

        Ok(Self {
            directory,
            overwrite,
        })
    }

    /// Target directory
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Whether existing files are replaced
    #[must_use]
    pub const fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Stores `file` under `name` instead of its own name
    ///
    /// `name` is sanitized like [`FileInfo::set_name`]. Unless it already
    /// carries an extension (a dot after its first character), the file's
    /// extension is appended. `file` itself is not renamed.
    ///
    /// # Errors
    ///
    /// As [`StorageBackend::store`].
    pub fn store_as(&self, file: &FileInfo, name: &str) -> StorageResult<StoredFile> {
        let name = sanitize_name(name);
        let has_extension = name.find('.').is_some_and(|dot| dot > 0);

        let file_name = if has_extension || file.extension().is_empty() {
            name
        } else {
            format!("{name}.{}", file.extension())
        };

        self.move_into(file, file_name)
    }

    fn move_into(&self, file: &FileInfo, file_name: String) -> StorageResult<StoredFile> {
        if file_name.is_empty() {
            return Err(StorageError::EmptyName);
        }

        let destination = self.directory.join(&file_name);
        if !self.overwrite && destination.exists() {
            tracing::warn!(
                file = %file_name,
                destination = %destination.display(),
                "Refusing to overwrite existing file"
            );
            return Err(StorageError::AlreadyExists {
                file: file_name,
                destination,
            });
        }

        if let Err(source) = move_file(file.path(), &destination) {
            tracing::warn!(
                file = %file_name,
                from = %file.path().display(),
                error = %source,
                "Could not move upload"
            );
            return Err(StorageError::MoveFailed {
                file: file_name,
                source,
            });
        }

        tracing::info!(file = %file_name, destination = %destination.display(), "Stored upload");
        Ok(StoredFile {
            filename: file_name,
            storage_path: destination,
        })
    }
}

impl StorageBackend for FileSystemStorage {
    fn store(&self, file: &mut FileInfo) -> StorageResult<StoredFile> {
        self.move_into(file, file.name_with_extension())
    }
}

fn is_writable(directory: &Path) -> bool {
    tempfile::Builder::new()
        .prefix(".acton-upload-check")
        .tempfile_in(directory)
        .is_ok()
}

/// Renames `from` to `to`, copying when they live on different filesystems
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => copy_then_rename(from, to),
        result => result,
    }
}

/// Copies into a temp file next to `to`, renames it over `to`, then removes `from`
///
/// The destination never holds a partially written file.
fn copy_then_rename(from: &Path, to: &Path) -> io::Result<()> {
    let directory = to.parent().unwrap_or_else(|| Path::new("."));
    let mut staged = tempfile::Builder::new()
        .prefix(".acton-upload-")
        .tempfile_in(directory)?;

    io::copy(&mut File::open(from)?, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    staged.persist(to).map_err(|err| err.error)?;

    release_source(from);
    Ok(())
}

/// Removes the copied source, returning whether it is gone
///
/// The destination is already complete at this point, so a leftover
/// source is only logged.
fn release_source(from: &Path) -> bool {
    match fs::remove_file(from) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(path = %from.display(), error = %err, "Could not remove copied upload");
            false
        }
    }
}
