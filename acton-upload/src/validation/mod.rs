//! Validation rules for uploaded files
//!
//! A [`ValidationRule`] inspects one [`FileInfo`] and either accepts it or
//! explains why not. Rules never move, delete, or rename files; they only
//! read what [`FileInfo`] exposes.
//!
//! # Security
//!
//! [`Mimetype`] checks the media type sniffed from the file content. The
//! client-declared name and `Content-Type` header are attacker-controlled and
//! are never consulted. Prefer it over [`Extension`] when the type matters.
//!
//! # Examples
//!
//! ```rust,no_run
//! use acton_upload::validation::{Dimensions, Extension, Mimetype, Size, ValidationRule};
//!
//! let rules: Vec<Box<dyn ValidationRule>> = vec![
//!     Box::new(Extension::new(["png", "jpg"])),
//!     Box::new(Mimetype::new(["image/png", "image/jpeg"])),
//!     Box::new(Size::new("5M").with_min("1K")),
//!     Box::new(Dimensions::new(640, 480)),
//! ];
//! ```
//!
//! Closures are rules too:
//!
//! ```rust
//! use acton_upload::file::FileInfo;
//! use acton_upload::validation::{ValidationError, ValidationRule};
//!
//! let no_dotfiles = |file: &FileInfo| {
//!     if file.name().is_empty() {
//!         Err(ValidationError::Custom("File name is required".to_string()))
//!     } else {
//!         Ok(())
//!     }
//! };
//! let _rule: Box<dyn ValidationRule> = Box::new(no_dotfiles);
//! ```

mod rules;
mod size;

pub use rules::{Dimensions, Extension, MediaType, Mimetype};
pub use size::{parse_human_size, ByteSize, Size};

use crate::error::MessageTemplate;
use crate::file::FileInfo;
use crate::intake::UploadErrorCode;
use std::io;
use thiserror::Error;

/// Why a file was rejected
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The temp path did not come from the upload channel
    #[error("Is not an uploaded file")]
    NotUploaded,

    /// The decoder reported a failed transfer
    #[error("{0}")]
    UploadChannel(UploadErrorCode),

    /// Extension outside the allowed set
    #[error("Invalid file extension. Must be one of: {}", .allowed.join(", "))]
    InvalidExtension {
        /// Allowed extensions, lower-cased
        allowed: Vec<String>,
        /// Extension of the rejected file
        actual: String,
    },

    /// Sniffed media type outside the allowed set
    #[error("Invalid mimetype. Must be one of: {}", .allowed.join(", "))]
    InvalidMimetype {
        /// Allowed media types, lower-cased
        allowed: Vec<String>,
        /// Media type of the rejected file
        actual: String,
    },

    /// Smaller than the minimum size
    #[error("File size is too small. Must be greater than or equal to: {min}")]
    TooSmall {
        /// Actual size in bytes
        size: u64,
        /// Minimum size in bytes
        min: u64,
    },

    /// Larger than the maximum size
    #[error("File size is too large. Must be less than or equal to: {max}")]
    TooLarge {
        /// Actual size in bytes
        size: u64,
        /// Maximum size in bytes
        max: u64,
    },

    /// The file is not a decodable image
    #[error("Could not detect image size.")]
    UndetectableDimensions,

    /// Width differs from the required width
    #[error("Image width({actual}px) does not match required width({expected}px)")]
    WidthMismatch {
        /// Actual width
        actual: u32,
        /// Required width
        expected: u32,
    },

    /// Height differs from the required height
    #[error("Image height({actual}px) does not match required height({expected}px)")]
    HeightMismatch {
        /// Actual height
        actual: u32,
        /// Required height
        expected: u32,
    },

    /// A rule needed file content that could not be read
    #[error("Could not read file: {0}")]
    Unreadable(#[from] io::Error),

    /// Failure reported by a caller-defined rule
    #[error("{0}")]
    Custom(String),
}

impl ValidationError {
    /// Describes this error as a translatable template
    #[must_use]
    pub fn template(&self) -> MessageTemplate {
        match self {
            Self::NotUploaded => MessageTemplate::new("Is not an uploaded file"),
            Self::UploadChannel(code) => code.template(),
            Self::InvalidExtension { allowed, .. } => MessageTemplate::with_params(
                "Invalid file extension. Must be one of: %s",
                [allowed.join(", ")],
            ),
            Self::InvalidMimetype { allowed, .. } => MessageTemplate::with_params(
                "Invalid mimetype. Must be one of: %s",
                [allowed.join(", ")],
            ),
            Self::TooSmall { min, .. } => MessageTemplate::with_params(
                "File size is too small. Must be greater than or equal to: %s",
                [min],
            ),
            Self::TooLarge { max, .. } => MessageTemplate::with_params(
                "File size is too large. Must be less than or equal to: %s",
                [max],
            ),
            Self::UndetectableDimensions => MessageTemplate::new("Could not detect image size."),
            Self::WidthMismatch { actual, expected } => MessageTemplate::with_params(
                "Image width(%spx) does not match required width(%spx)",
                [actual, expected],
            ),
            Self::HeightMismatch { actual, expected } => MessageTemplate::with_params(
                "Image height(%spx) does not match required height(%spx)",
                [actual, expected],
            ),
            Self::Unreadable(err) => MessageTemplate::with_params("Could not read file: %s", [err]),
            Self::Custom(reason) => MessageTemplate::with_params("%s", [reason]),
        }
    }
}

/// A constraint an uploaded file must satisfy
///
/// Rules are configured at construction and hold no per-call state, so one
/// rule can be shared by many batches.
#[cfg_attr(test, mockall::automock)]
pub trait ValidationRule: Send + Sync {
    /// Accepts `file` or explains why it is rejected
    ///
    /// # Errors
    ///
    /// Returns the reason the file breaks this rule.
    fn validate(&self, file: &FileInfo) -> Result<(), ValidationError>;
}

impl<F> ValidationRule for F
where
    F: Fn(&FileInfo) -> Result<(), ValidationError> + Send + Sync,
{
    fn validate(&self, file: &FileInfo) -> Result<(), ValidationError> {
        self(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_matches_display() {
        let errors = vec![
            ValidationError::NotUploaded,
            ValidationError::UploadChannel(UploadErrorCode::NoFile),
            ValidationError::InvalidExtension {
                allowed: vec!["png".to_string(), "jpg".to_string()],
                actual: "exe".to_string(),
            },
            ValidationError::InvalidMimetype {
                allowed: vec!["image/png".to_string()],
                actual: "text/plain".to_string(),
            },
            ValidationError::TooSmall { size: 1, min: 10 },
            ValidationError::TooLarge { size: 11, max: 10 },
            ValidationError::UndetectableDimensions,
            ValidationError::WidthMismatch {
                actual: 100,
                expected: 200,
            },
            ValidationError::HeightMismatch {
                actual: 100,
                expected: 200,
            },
            ValidationError::Unreadable(io::Error::new(io::ErrorKind::NotFound, "gone")),
            ValidationError::Custom("100% wrong".to_string()),
        ];

        for err in errors {
            assert_eq!(err.template().render(), err.to_string());
        }
    }

    #[test]
    fn test_messages() {
        let err = ValidationError::InvalidExtension {
            allowed: vec!["png".to_string(), "jpg".to_string()],
            actual: "gif".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid file extension. Must be one of: png, jpg");

        let err = ValidationError::WidthMismatch {
            actual: 100,
            expected: 200,
        };
        assert_eq!(
            err.to_string(),
            "Image width(100px) does not match required width(200px)"
        );
    }
}
