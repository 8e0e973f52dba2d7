//! Upload channel verification
//!
//! Before a batch touches a temp file it asks the channel whether that path
//! really was produced by the upload decoder. A path that merely exists on
//! disk (say `/etc/passwd` smuggled in through a forged form) must never be
//! validated or moved.

use parking_lot::RwLock;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Vouches for temp paths produced by an upload decoder
#[cfg_attr(test, mockall::automock)]
pub trait UploadChannel: Send + Sync {
    /// Returns `true` if `path` is a file received through this channel
    fn is_uploaded_file(&self, path: &Path) -> bool;
}

/// Accepts regular files placed directly inside the decoder's temp directory
///
/// Symlinks, nested paths, and anything outside `root` are rejected.
#[derive(Debug, Clone)]
pub struct TempDirChannel {
    root: PathBuf,
}

impl TempDirChannel {
    /// Creates a channel for files spooled into `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the decoder spools into
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl UploadChannel for TempDirChannel {
    fn is_uploaded_file(&self, path: &Path) -> bool {
        let is_regular = fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_file());
        if !is_regular {
            return false;
        }

        match (self.root.canonicalize(), path.canonicalize()) {
            (Ok(root), Ok(file)) => file.parent() == Some(root.as_path()),
            _ => false,
        }
    }
}

/// Registry of temp files written by [`spool`](super::multipart::spool)
///
/// Only registered paths count as uploads. Files that were not moved away
/// by a storage backend can be removed with [`cleanup`](Self::cleanup).
#[derive(Debug, Default)]
pub struct SpooledFiles {
    paths: RwLock<HashSet<PathBuf>>,
}

impl SpooledFiles {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a temp file written by the decoder
    pub fn register(&self, path: impl Into<PathBuf>) {
        self.paths.write().insert(path.into());
    }

    /// Forgets a temp file, typically after it was discarded
    pub fn forget(&self, path: &Path) {
        self.paths.write().remove(path);
    }

    /// Number of registered temp files
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.read().len()
    }

    /// Whether no temp file is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.read().is_empty()
    }

    /// Removes registered temp files that are still on disk
    ///
    /// Returns how many files were removed. The registry is emptied.
    ///
    /// # Errors
    ///
    /// Returns the first error other than "not found"; the remaining
    /// files are still attempted.
    pub fn cleanup(&self) -> io::Result<usize> {
        let paths: Vec<PathBuf> = self.paths.write().drain().collect();
        let mut removed = 0;
        let mut first_error = None;

        for path in paths {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "Failed to remove spooled upload");
                    first_error.get_or_insert(err);
                }
            }
        }

        first_error.map_or(Ok(removed), Err)
    }
}

impl UploadChannel for SpooledFiles {
    fn is_uploaded_file(&self, path: &Path) -> bool {
        self.paths.read().contains(path) && path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_temp_dir_channel_accepts_direct_children() {
        let root = TempDir::new().unwrap();
        let upload = root.path().join("upload-abc");
        fs::write(&upload, b"data").unwrap();

        let channel = TempDirChannel::new(root.path());
        assert!(channel.is_uploaded_file(&upload));
    }

    #[test]
    fn test_temp_dir_channel_rejects_outsiders() {
        let root = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let outsider = elsewhere.path().join("secret");
        fs::write(&outsider, b"data").unwrap();

        let nested_dir = root.path().join("nested");
        fs::create_dir(&nested_dir).unwrap();
        let nested = nested_dir.join("file");
        fs::write(&nested, b"data").unwrap();

        let channel = TempDirChannel::new(root.path());
        assert!(!channel.is_uploaded_file(&outsider));
        assert!(!channel.is_uploaded_file(&nested));
        assert!(!channel.is_uploaded_file(&root.path().join("missing")));
        assert!(!channel.is_uploaded_file(root.path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_temp_dir_channel_rejects_symlinks() {
        let root = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let target = elsewhere.path().join("secret");
        fs::write(&target, b"data").unwrap();
        let link = root.path().join("innocent");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let channel = TempDirChannel::new(root.path());
        assert!(!channel.is_uploaded_file(&link));
    }

    #[test]
    fn test_spooled_files_registry() {
        let dir = TempDir::new().unwrap();
        let registered = dir.path().join("a");
        let stranger = dir.path().join("b");
        fs::write(&registered, b"1").unwrap();
        fs::write(&stranger, b"2").unwrap();

        let spooled = SpooledFiles::new();
        spooled.register(&registered);

        assert!(spooled.is_uploaded_file(&registered));
        assert!(!spooled.is_uploaded_file(&stranger));
        assert_eq!(spooled.len(), 1);

        spooled.forget(&registered);
        assert!(!spooled.is_uploaded_file(&registered));
        assert!(spooled.is_empty());
    }

    #[test]
    fn test_spooled_files_cleanup() {
        let dir = TempDir::new().unwrap();
        let left_behind = dir.path().join("left");
        let moved = dir.path().join("moved");
        fs::write(&left_behind, b"1").unwrap();

        let spooled = SpooledFiles::new();
        spooled.register(&left_behind);
        spooled.register(&moved);

        assert_eq!(spooled.cleanup().unwrap(), 1);
        assert!(!left_behind.exists());
        assert!(spooled.is_empty());
    }
}
