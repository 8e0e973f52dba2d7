//! Error types and error handling
//!
//! Errors are split along the lifecycle of an upload:
//!
//! - [`InputError`]: the decoded form is missing or malformed. Raised while a
//!   batch is being constructed and never recovered.
//! - [`ValidationError`](crate::validation::ValidationError): one file broke
//!   one rule. Recorded on the batch, never aborts sibling files.
//! - [`StorageError`](crate::storage::StorageError): the backend could not
//!   persist a file. Aborts the upload in progress.
//! - [`UploadError`]: what [`UploadBatch::upload`](crate::upload::UploadBatch::upload)
//!   returns to the caller.
//!
//! Every user-facing error can describe itself as a [`MessageTemplate`]: a
//! stable English key plus positional parameters. Rendering a template
//! without a [`Translation`](crate::translation::Translation) yields the same
//! text as the error's `Display` implementation.

use crate::storage::StorageError;
use std::fmt;
use thiserror::Error;

/// Result type for fallible upload operations
pub type Result<T, E = UploadError> = std::result::Result<T, E>;

/// A stable message key with positional `%s` parameters
///
/// # Examples
///
/// ```rust
/// use acton_upload::error::MessageTemplate;
///
/// let template = MessageTemplate::with_params(
///     "Cannot find uploaded file(s) identified by key: %s",
///     ["avatar"],
/// );
/// assert_eq!(
///     template.render(),
///     "Cannot find uploaded file(s) identified by key: avatar"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    key: &'static str,
    params: Vec<String>,
}

impl MessageTemplate {
    /// Creates a template without parameters
    #[must_use]
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            params: Vec::new(),
        }
    }

    /// Creates a template with positional parameters
    #[must_use]
    pub fn with_params<I, P>(key: &'static str, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: ToString,
    {
        Self {
            key,
            params: params.into_iter().map(|p| p.to_string()).collect(),
        }
    }

    /// The English message key
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// The positional parameters
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Renders the template in English
    #[must_use]
    pub fn render(&self) -> String {
        substitute(self.key, &self.params)
    }
}

impl fmt::Display for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Replaces each `%s` in `template` with the next parameter
///
/// `%%` renders a literal percent sign. Placeholders without a matching
/// parameter are kept verbatim.
pub(crate) fn substitute<P: AsRef<str>>(template: &str, params: &[P]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut params = params.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('s') => {
                chars.next();
                match params.next() {
                    Some(param) => out.push_str(param.as_ref()),
                    None => out.push_str("%s"),
                }
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }

    out
}

/// Errors raised while reading the decoded upload form
#[derive(Debug, Error)]
pub enum InputError {
    /// The requested field key is not part of the form
    #[error("Cannot find uploaded file(s) identified by key: {0}")]
    MissingField(String),

    /// Parallel lists of a multi-file field have different lengths
    #[error("Uploaded file lists for key {0} have mismatched lengths")]
    MismatchedLists(String),

    /// The upload error code is outside the defined enumeration
    #[error("Unknown upload error code {code} for key: {key}")]
    UnknownErrorCode {
        /// Field key
        key: String,
        /// Offending code
        code: i64,
    },

    /// The serialized upload form does not have the expected shape
    #[error("Malformed upload form: {0}")]
    Decode(String),

    /// The multipart body could not be decoded
    #[error("Malformed multipart request: {0}")]
    Multipart(String),

    /// More file parts than the intake allows
    #[error("Upload contains more than {max} files")]
    TooManyFiles {
        /// Maximum allowed
        max: usize,
    },

    /// I/O error while spooling uploads
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl InputError {
    /// Describes this error as a translatable template
    #[must_use]
    pub fn template(&self) -> MessageTemplate {
        match self {
            Self::MissingField(key) => MessageTemplate::with_params(
                "Cannot find uploaded file(s) identified by key: %s",
                [key],
            ),
            Self::MismatchedLists(key) => MessageTemplate::with_params(
                "Uploaded file lists for key %s have mismatched lengths",
                [key],
            ),
            Self::UnknownErrorCode { key, code } => MessageTemplate::with_params(
                "Unknown upload error code %s for key: %s",
                [code.to_string(), key.clone()],
            ),
            Self::Decode(reason) => {
                MessageTemplate::with_params("Malformed upload form: %s", [reason])
            }
            Self::Multipart(reason) => {
                MessageTemplate::with_params("Malformed multipart request: %s", [reason])
            }
            Self::TooManyFiles { max } => {
                MessageTemplate::with_params("Upload contains more than %s files", [max])
            }
            Self::Io(err) => MessageTemplate::with_params("I/O error: %s", [err]),
        }
    }
}

impl From<multer::Error> for InputError {
    fn from(err: multer::Error) -> Self {
        Self::Multipart(err.to_string())
    }
}

/// Errors returned by [`UploadBatch::upload`](crate::upload::UploadBatch::upload)
#[derive(Debug, Error)]
pub enum UploadError {
    /// The decoded form could not be read
    #[error(transparent)]
    Input(#[from] InputError),

    /// At least one file failed validation; nothing was stored
    #[error("File validation failed")]
    ValidationFailed {
        /// Every error recorded on the batch, in order
        errors: Vec<String>,
    },

    /// The storage backend failed; files stored earlier in the batch stay in place
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl UploadError {
    /// Describes this error as a translatable template
    #[must_use]
    pub fn template(&self) -> MessageTemplate {
        match self {
            Self::Input(err) => err.template(),
            Self::ValidationFailed { .. } => MessageTemplate::new("File validation failed"),
            Self::Storage(err) => err.template(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_positional() {
        assert_eq!(substitute("%s and %s", &["a", "b"]), "a and b");
    }

    #[test]
    fn test_substitute_missing_param_kept() {
        assert_eq!(substitute("%s and %s", &["a"]), "a and %s");
    }

    #[test]
    fn test_substitute_literal_percent() {
        assert_eq!(substitute("100%% of %s", &["files"]), "100% of files");
        assert_eq!(substitute("50% off", &[] as &[&str]), "50% off");
    }

    #[test]
    fn test_input_error_template_matches_display() {
        let errors = vec![
            InputError::MissingField("avatar".to_string()),
            InputError::MismatchedLists("docs".to_string()),
            InputError::UnknownErrorCode {
                key: "docs".to_string(),
                code: 5,
            },
            InputError::Decode("expected a map".to_string()),
            InputError::Multipart("boundary missing".to_string()),
            InputError::TooManyFiles { max: 3 },
        ];

        for err in errors {
            assert_eq!(err.template().render(), err.to_string());
        }
    }

    #[test]
    fn test_validation_failed_message() {
        let err = UploadError::ValidationFailed { errors: vec![] };
        assert_eq!(err.to_string(), "File validation failed");
        assert_eq!(err.template().key(), "File validation failed");
    }
}
