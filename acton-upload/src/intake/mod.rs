//! Decoded upload input
//!
//! The web server's multipart decoder hands over, per form field, one or more
//! `(temp path, client file name, size, error code)` tuples. This module
//! models that contract:
//!
//! - [`FileDescriptor`]: one submitted file, before any validation
//! - [`UploadErrorCode`]: the decoder's verdict on the transfer itself
//! - [`FileUploads`]: the whole form, keyed by field name, together with the
//!   [`UploadChannel`] that vouches for its temp paths
//!
//! [`FileUploads`] can be deserialized from the conventional upload-array
//! shape, where a multi-file field carries parallel lists:
//!
//! ```rust
//! use acton_upload::intake::{FileUploads, TempDirChannel, UploadErrorCode};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), acton_upload::error::InputError> {
//! let json = r#"{
//!     "avatar": {"name": "me.png", "tmp_name": "/tmp/up/a1", "size": 512, "error": 0},
//!     "docs": {
//!         "name": ["a.pdf", "b.pdf"],
//!         "tmp_name": ["/tmp/up/b1", ""],
//!         "error": [0, 4]
//!     }
//! }"#;
//!
//! let form = FileUploads::from_json(json, Arc::new(TempDirChannel::new("/tmp/up")))?;
//! assert_eq!(form.descriptors("avatar")?.len(), 1);
//! assert_eq!(form.descriptors("docs")?[1].error, UploadErrorCode::NoFile);
//! # Ok(())
//! # }
//! ```

mod channel;
pub mod multipart;

#[cfg(test)]
pub use channel::MockUploadChannel;
pub use channel::{SpooledFiles, TempDirChannel, UploadChannel};
pub use multipart::{spool, spool_request, SpoolOptions, SpooledForm};

use crate::error::{InputError, MessageTemplate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Outcome of the transfer of one file, as reported by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UploadErrorCode {
    /// The file arrived intact
    #[default]
    Ok,
    /// Larger than the server-wide upload limit
    ExceedsIniLimit,
    /// Larger than the limit declared by the form
    ExceedsFormLimit,
    /// Only part of the file arrived
    Partial,
    /// The field was submitted without a file
    NoFile,
    /// The server has no temp directory
    NoTmpDir,
    /// The temp file could not be written
    WriteFailed,
    /// A server extension stopped the transfer
    ExtensionBlocked,
}

impl UploadErrorCode {
    /// Maps a numeric code; 5 and anything above 8 are undefined
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::ExceedsIniLimit),
            2 => Some(Self::ExceedsFormLimit),
            3 => Some(Self::Partial),
            4 => Some(Self::NoFile),
            6 => Some(Self::NoTmpDir),
            7 => Some(Self::WriteFailed),
            8 => Some(Self::ExtensionBlocked),
            _ => None,
        }
    }

    /// Numeric code
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Ok => 0,
            Self::ExceedsIniLimit => 1,
            Self::ExceedsFormLimit => 2,
            Self::Partial => 3,
            Self::NoFile => 4,
            Self::NoTmpDir => 6,
            Self::WriteFailed => 7,
            Self::ExtensionBlocked => 8,
        }
    }

    /// Whether the file arrived intact
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// English explanation, also the translation key
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Ok => "There is no error, the file uploaded with success",
            Self::ExceedsIniLimit => "The uploaded file exceeds the maximum upload size of the server",
            Self::ExceedsFormLimit => {
                "The uploaded file exceeds the MAX_FILE_SIZE directive that was specified in the HTML form"
            }
            Self::Partial => "The uploaded file was only partially uploaded",
            Self::NoFile => "No file was uploaded",
            Self::NoTmpDir => "Missing a temporary folder",
            Self::WriteFailed => "Failed to write file to disk",
            Self::ExtensionBlocked => "A server extension stopped the file upload",
        }
    }

    /// Describes this code as a translatable template
    #[must_use]
    pub const fn template(self) -> MessageTemplate {
        MessageTemplate::new(self.message())
    }
}

impl fmt::Display for UploadErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// One submitted file as decoded from the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Where the decoder spooled the content
    pub temp_path: PathBuf,
    /// File name as sent by the client (untrusted)
    pub declared_name: String,
    /// Size in bytes, when the decoder knows it
    pub size: Option<u64>,
    /// Transfer outcome
    pub error: UploadErrorCode,
}

impl FileDescriptor {
    /// Creates a descriptor for an intact upload
    #[must_use]
    pub fn new(temp_path: impl Into<PathBuf>, declared_name: impl Into<String>) -> Self {
        Self {
            temp_path: temp_path.into(),
            declared_name: declared_name.into(),
            size: None,
            error: UploadErrorCode::Ok,
        }
    }

    /// Creates a descriptor for a failed transfer
    #[must_use]
    pub fn failed(declared_name: impl Into<String>, error: UploadErrorCode) -> Self {
        Self {
            temp_path: PathBuf::new(),
            declared_name: declared_name.into(),
            size: None,
            error,
        }
    }

    /// Sets the size reported by the decoder
    #[must_use]
    pub const fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the transfer outcome
    #[must_use]
    pub const fn with_error(mut self, error: UploadErrorCode) -> Self {
        self.error = error;
        self
    }
}

/// A scalar or a list of parallel scalars
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// Single-file field
    One(T),
    /// Multi-file field
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// One field of the conventional upload array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawField {
    /// Client file name(s)
    pub name: OneOrMany<String>,
    /// Temp path(s)
    pub tmp_name: OneOrMany<String>,
    /// Size(s) in bytes
    #[serde(default)]
    pub size: Option<OneOrMany<u64>>,
    /// Numeric error code(s); absent means success
    #[serde(default)]
    pub error: Option<OneOrMany<i64>>,
}

impl RawField {
    /// Converts the parallel lists into descriptors
    ///
    /// # Errors
    ///
    /// Fails when the lists differ in length or a code is undefined.
    pub fn into_descriptors(self, key: &str) -> Result<Vec<FileDescriptor>, InputError> {
        let names = self.name.into_vec();
        let temp_paths = self.tmp_name.into_vec();
        let count = names.len();

        let sizes: Vec<Option<u64>> = match self.size {
            Some(sizes) => sizes.into_vec().into_iter().map(Some).collect(),
            None => vec![None; count],
        };
        let codes = match self.error {
            Some(codes) => codes.into_vec(),
            None => vec![0; count],
        };

        if temp_paths.len() != count || sizes.len() != count || codes.len() != count {
            return Err(InputError::MismatchedLists(key.to_string()));
        }

        names
            .into_iter()
            .zip(temp_paths)
            .zip(sizes)
            .zip(codes)
            .map(|(((name, temp_path), size), code)| {
                let error = UploadErrorCode::from_code(code).ok_or_else(|| {
                    InputError::UnknownErrorCode {
                        key: key.to_string(),
                        code,
                    }
                })?;
                Ok(FileDescriptor {
                    temp_path: PathBuf::from(temp_path),
                    declared_name: name,
                    size,
                    error,
                })
            })
            .collect()
    }
}

/// The decoded upload form
///
/// Field order is not significant; file order within a field is.
pub struct FileUploads {
    fields: BTreeMap<String, Vec<FileDescriptor>>,
    channel: Arc<dyn UploadChannel>,
}

impl FileUploads {
    /// Creates an empty form whose temp paths are vouched for by `channel`
    #[must_use]
    pub fn new(channel: Arc<dyn UploadChannel>) -> Self {
        Self {
            fields: BTreeMap::new(),
            channel,
        }
    }

    /// Builds a form from raw upload-array fields
    ///
    /// # Errors
    ///
    /// Fails on the first malformed field.
    pub fn from_raw<I>(raw: I, channel: Arc<dyn UploadChannel>) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = (String, RawField)>,
    {
        let mut form = Self::new(channel);
        for (key, field) in raw {
            let descriptors = field.into_descriptors(&key)?;
            form.fields.insert(key, descriptors);
        }
        Ok(form)
    }

    /// Parses a form from its JSON upload-array representation
    ///
    /// # Errors
    ///
    /// Fails when the JSON does not have the upload-array shape or a field
    /// is malformed.
    pub fn from_json(json: &str, channel: Arc<dyn UploadChannel>) -> Result<Self, InputError> {
        let raw: BTreeMap<String, RawField> =
            serde_json::from_str(json).map_err(|e| InputError::Decode(e.to_string()))?;
        Self::from_raw(raw, channel)
    }

    /// Appends a file to a field, creating the field if needed
    pub fn push(&mut self, key: impl Into<String>, descriptor: FileDescriptor) {
        self.fields.entry(key.into()).or_default().push(descriptor);
    }

    /// Descriptors submitted under `key`, in submission order
    ///
    /// # Errors
    ///
    /// Returns [`InputError::MissingField`] if the form has no such field.
    pub fn descriptors(&self, key: &str) -> Result<&[FileDescriptor], InputError> {
        self.fields
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| InputError::MissingField(key.to_string()))
    }

    /// Field keys present in the form
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Whether the form carries a field named `key`
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// The channel vouching for this form's temp paths
    #[must_use]
    pub fn channel(&self) -> Arc<dyn UploadChannel> {
        Arc::clone(&self.channel)
    }
}

impl fmt::Debug for FileUploads {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUploads")
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}
