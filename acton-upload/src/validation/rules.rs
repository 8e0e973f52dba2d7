//! Extension, media type, and image dimension rules

use super::{ValidationError, ValidationRule};
use crate::file::FileInfo;

/// Accepts files whose extension is in an allowed set
///
/// Matching is case-insensitive.
///
/// ```rust
/// use acton_upload::validation::Extension;
///
/// let rule = Extension::new(["PNG", "jpg"]);
/// assert_eq!(rule.allowed(), ["png", "jpg"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    allowed: Vec<String>,
}

impl Extension {
    /// Creates a rule allowing `extensions`
    #[must_use]
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: extensions
                .into_iter()
                .map(|ext| ext.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Allowed extensions, lower-cased
    #[must_use]
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}

impl ValidationRule for Extension {
    fn validate(&self, file: &FileInfo) -> Result<(), ValidationError> {
        let actual = file.extension().to_lowercase();
        if self.allowed.contains(&actual) {
            return Ok(());
        }

        Err(ValidationError::InvalidExtension {
            allowed: self.allowed.clone(),
            actual,
        })
    }
}

/// Accepts files whose sniffed media type is in an allowed set
///
/// The media type comes from the file content, see
/// [`FileInfo::mimetype`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mimetype {
    allowed: Vec<String>,
}

/// Alternative name for [`Mimetype`]
pub type MediaType = Mimetype;

impl Mimetype {
    /// Creates a rule allowing `mimetypes`
    #[must_use]
    pub fn new<I, S>(mimetypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: mimetypes
                .into_iter()
                .map(|mime| mime.as_ref().trim().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Allowed media types, lower-cased
    #[must_use]
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}

impl ValidationRule for Mimetype {
    fn validate(&self, file: &FileInfo) -> Result<(), ValidationError> {
        let actual = file.mimetype()?;
        if self.allowed.iter().any(|allowed| allowed == actual) {
            return Ok(());
        }

        Err(ValidationError::InvalidMimetype {
            allowed: self.allowed.clone(),
            actual: actual.to_string(),
        })
    }
}

/// Requires an image of exactly the given width and height
///
/// Files that are not decodable images are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    /// Creates a rule requiring `width` x `height` pixels
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Required width in pixels
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Required height in pixels
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

impl ValidationRule for Dimensions {
    fn validate(&self, file: &FileInfo) -> Result<(), ValidationError> {
        let actual = file
            .dimensions()
            .ok_or(ValidationError::UndetectableDimensions)?;

        if actual.width != self.width {
            return Err(ValidationError::WidthMismatch {
                actual: actual.width,
                expected: self.width,
            });
        }
        if actual.height != self.height {
            return Err(ValidationError::HeightMismatch {
                actual: actual.height,
                expected: self.height,
            });
        }
        Ok(())
    }
}
