//! Uploaded file metadata
//!
//! [`FileInfo`] wraps one uploaded file sitting at its temporary location and
//! exposes what validation rules and storage backends need to know about it:
//! a sanitized, rewritable name and extension, the content-sniffed media
//! type, size, digests, and image dimensions.
//!
//! # Examples
//!
//! ```rust,no_run
//! use acton_upload::file::FileInfo;
//! use acton_upload::intake::TempDirChannel;
//! use std::sync::Arc;
//!
//! # fn example() -> std::io::Result<()> {
//! let channel = Arc::new(TempDirChannel::new("/tmp/uploads"));
//! let mut info = FileInfo::new("/tmp/uploads/php4Xa9", Some("Holiday Photo.JPG"), channel);
//!
//! assert_eq!(info.name(), "Holiday Photo");
//! assert_eq!(info.extension(), "jpg");
//!
//! info.set_name("holiday");
//! assert_eq!(info.name_with_extension(), "holiday.jpg");
//!
//! println!("{} bytes of {}", info.size()?, info.mimetype()?);
//! # Ok(())
//! # }
//! ```

mod hash;
pub mod mimetype;
mod name;

pub use hash::{HashAlgorithm, UnsupportedHash};
pub use name::sanitize_name;
pub(crate) use name::split_name;

use crate::intake::{FileDescriptor, UploadChannel};
use image::ImageReader;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Width and height of an image, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An uploaded file at its temporary location
///
/// The name is sanitized on every write. The media type is sniffed from the
/// file content on first access and cached; digests are recomputed on each
/// call.
pub struct FileInfo {
    path: PathBuf,
    name: String,
    extension: String,
    declared_size: Option<u64>,
    mimetype: OnceCell<String>,
    channel: Arc<dyn UploadChannel>,
}

impl FileInfo {
    /// Creates file info for the file at `path`
    ///
    /// The name and extension come from `desired_name` when given, otherwise
    /// from the last component of `path`.
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        desired_name: Option<&str>,
        channel: Arc<dyn UploadChannel>,
    ) -> Self {
        let path = path.into();
        let source = desired_name.map_or_else(|| path.to_string_lossy().into_owned(), str::to_string);
        let (name, extension) = split_name(&source);

        let mut info = Self {
            name: String::new(),
            extension: String::new(),
            declared_size: None,
            mimetype: OnceCell::new(),
            path,
            channel,
        };
        info.set_name(name).set_extension(extension);
        info
    }

    /// Creates file info from a decoded upload descriptor
    ///
    /// A size reported by the decoder is trusted by [`size`](Self::size).
    #[must_use]
    pub fn from_descriptor(descriptor: &FileDescriptor, channel: Arc<dyn UploadChannel>) -> Self {
        let mut info = Self::new(
            descriptor.temp_path.clone(),
            Some(&descriptor.declared_name),
            channel,
        );
        info.declared_size = descriptor.size;
        info
    }

    /// Temporary path of the uploaded file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without extension
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the file name (without extension), sanitizing it
    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.name = sanitize_name(name);
        self
    }

    /// Lower-cased extension without the leading dot
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Sets the extension; an empty extension is allowed
    pub fn set_extension(&mut self, extension: &str) -> &mut Self {
        self.extension = extension.to_lowercase();
        self
    }

    /// Name and extension joined by a dot, or the bare name without an extension
    #[must_use]
    pub fn name_with_extension(&self) -> String {
        if self.extension.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.extension)
        }
    }

    /// Media type sniffed from the file content
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn mimetype(&self) -> io::Result<&str> {
        self.mimetype
            .get_or_try_init(|| {
                let detected = mimetype::sniff_path(&self.path)?;
                tracing::debug!(file = %self.name_with_extension(), mimetype = %detected, "Sniffed media type");
                Ok(detected)
            })
            .map(String::as_str)
    }

    /// Size in bytes
    ///
    /// Uses the size reported by the decoder when there is one, otherwise
    /// reads it from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the size must be read from disk and the file is missing.
    pub fn size(&self) -> io::Result<u64> {
        match self.declared_size {
            Some(size) => Ok(size),
            None => Ok(std::fs::metadata(&self.path)?.len()),
        }
    }

    /// Hex digest of the file content
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn hash(&self, algorithm: HashAlgorithm) -> io::Result<String> {
        algorithm.digest_file(&self.path)
    }

    /// MD5 hex digest of the file content
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn md5(&self) -> io::Result<String> {
        self.hash(HashAlgorithm::Md5)
    }

    /// Pixel dimensions, or `None` when the file is not a decodable image
    #[must_use]
    pub fn dimensions(&self) -> Option<Dimensions> {
        let result = ImageReader::open(&self.path)
            .and_then(ImageReader::with_guessed_format)
            .map_err(image::ImageError::IoError)
            .and_then(ImageReader::into_dimensions);

        match result {
            Ok((width, height)) => Some(Dimensions { width, height }),
            Err(err) => {
                tracing::debug!(file = %self.name_with_extension(), error = %err, "Could not read image dimensions");
                None
            }
        }
    }

    /// Whether the temp file really came from the upload channel
    #[must_use]
    pub fn is_uploaded_file(&self) -> bool {
        self.channel.is_uploaded_file(&self.path)
    }
}

impl fmt::Debug for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileInfo")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("extension", &self.extension)
            .field("declared_size", &self.declared_size)
            .field("mimetype", &self.mimetype.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::MockUploadChannel;
    use image::{ImageFormat, RgbImage};
    use std::io::Write;
    use tempfile::TempDir;

    fn trusting() -> Arc<dyn UploadChannel> {
        let mut channel = MockUploadChannel::new();
        channel.expect_is_uploaded_file().return_const(true);
        Arc::new(channel)
    }

    fn fixture(dir: &TempDir, file_name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(file_name);
        std::fs::File::create(&path).unwrap().write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_name_and_extension_from_desired_name() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "phpA1b2", b"Hello");

        let info = FileInfo::new(&path, Some("foo.txt"), trusting());
        assert_eq!(info.name(), "foo");
        assert_eq!(info.extension(), "txt");
        assert_eq!(info.name_with_extension(), "foo.txt");

        let bare = FileInfo::new(&path, Some("foo_wo_ext"), trusting());
        assert_eq!(bare.name(), "foo_wo_ext");
        assert_eq!(bare.extension(), "");
        assert_eq!(bare.name_with_extension(), "foo_wo_ext");
    }

    #[test]
    fn test_name_from_path_when_no_desired_name() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "report.PDF", b"%PDF-1.4");

        let info = FileInfo::new(&path, None, trusting());
        assert_eq!(info.name(), "report");
        assert_eq!(info.extension(), "pdf");
    }

    #[test]
    fn test_setters_chain() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "tmp", b"");

        let mut info = FileInfo::new(&path, Some("x.y"), trusting());
        info.set_name("a").set_extension("b");
        assert_eq!(info.name_with_extension(), "a.b");

        info.set_extension("");
        assert_eq!(info.name_with_extension(), "a");

        info.set_extension("CSV");
        assert_eq!(info.extension(), "csv");
    }

    #[test]
    fn test_client_name_cannot_traverse() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "tmp", b"");

        let info = FileInfo::new(&path, Some("../../etc/passwd.txt"), trusting());
        assert_eq!(info.name(), "passwd");
        assert_eq!(info.name_with_extension(), "passwd.txt");
    }

    #[test]
    fn test_mimetype_is_sniffed_and_cached() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "tmp", b"plain words");

        let info = FileInfo::new(&path, Some("image.png"), trusting());
        assert_eq!(info.mimetype().unwrap(), "text/plain");

        // Cached: replacing the content does not change the answer
        std::fs::write(&path, [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]).unwrap();
        assert_eq!(info.mimetype().unwrap(), "text/plain");
    }

    #[test]
    fn test_size_prefers_declared_size() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "tmp", b"12345");

        let info = FileInfo::new(&path, Some("a.txt"), trusting());
        assert_eq!(info.size().unwrap(), 5);

        let descriptor = FileDescriptor::new(&path, "a.txt").with_size(42);
        let declared = FileInfo::from_descriptor(&descriptor, trusting());
        assert_eq!(declared.size().unwrap(), 42);
    }

    #[test]
    fn test_size_of_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let info = FileInfo::new(dir.path().join("gone"), Some("a.txt"), trusting());
        assert!(info.size().is_err());
    }

    #[test]
    fn test_hashes() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "tmp", b"abc");
        let info = FileInfo::new(&path, Some("a.txt"), trusting());

        assert_eq!(info.md5().unwrap(), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(info.hash(HashAlgorithm::default()).unwrap(), info.md5().unwrap());
        assert_eq!(
            info.hash(HashAlgorithm::Sha1).unwrap(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_dimensions_of_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("upload-tmp");
        RgbImage::new(7, 3)
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let info = FileInfo::new(&path, Some("pixel.png"), trusting());
        assert_eq!(
            info.dimensions(),
            Some(Dimensions {
                width: 7,
                height: 3
            })
        );
    }

    #[test]
    fn test_dimensions_of_non_image() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "tmp", b"definitely not an image");

        let info = FileInfo::new(&path, Some("fake.png"), trusting());
        assert_eq!(info.dimensions(), None);
    }

    #[test]
    fn test_is_uploaded_file_delegates_to_channel() {
        let dir = TempDir::new().unwrap();
        let path = fixture(&dir, "tmp", b"");

        let mut channel = MockUploadChannel::new();
        channel
            .expect_is_uploaded_file()
            .withf(|p| p.ends_with("tmp"))
            .times(1)
            .return_const(false);

        let info = FileInfo::new(&path, Some("a.txt"), Arc::new(channel));
        assert!(!info.is_uploaded_file());
    }
}
