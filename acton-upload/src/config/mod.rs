//! Configuration for upload pipelines
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `ACTON_UPLOAD_` prefix, `__`
//!    between section and key)
//! 2. `./upload.toml`
//! 3. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # upload.toml
//! language = "pt-BR"
//!
//! [storage]
//! directory = "/var/uploads/avatars"
//! overwrite = false
//! hashed_names = true
//!
//! [validation]
//! extensions = ["png", "jpg"]
//! mimetypes = ["image/png", "image/jpeg"]
//! max_size = "2M"
//! width = 512
//! height = 512
//!
//! [intake]
//! max_file_size = "8M"
//! max_files = 4
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use acton_upload::config::UploadConfig;
//! use acton_upload::intake::FileUploads;
//! use acton_upload::upload::UploadBatch;
//!
//! # fn example(form: &FileUploads) -> anyhow::Result<()> {
//! let config = UploadConfig::load()?;
//!
//! let mut batch = UploadBatch::from_form(form, "avatar", config.storage()?)?;
//! batch.add_validations(config.validations());
//!
//! if batch.upload().is_err() {
//!     let translation = config.translation()?;
//!     for error in batch.translated_errors(&translation) {
//!         eprintln!("{error}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use crate::intake::multipart::{DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_SIZE};
use crate::intake::SpoolOptions;
use crate::storage::{FileSystemStorage, HashedFileSystemStorage, StorageBackend, StorageResult};
use crate::translation::{Translation, TranslationError};
use crate::validation::{ByteSize, Dimensions, Extension, Mimetype, Size, ValidationRule};
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where and how validated files are stored
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Target directory; must exist and be writable
    pub directory: PathBuf,

    /// Replace files that already exist at the destination
    pub overwrite: bool,

    /// Rename every file to a random hash before storing it
    pub hashed_names: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./uploads"),
            overwrite: false,
            hashed_names: false,
        }
    }
}

/// Rules applied to every file of a batch
///
/// Only the constraints that are set produce a rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Accepted extensions
    pub extensions: Vec<String>,

    /// Accepted media types
    pub mimetypes: Vec<String>,

    /// Largest accepted size; a byte count or a string such as `"2M"`
    pub max_size: Option<ByteSize>,

    /// Smallest accepted size
    pub min_size: Option<ByteSize>,

    /// Required image width in pixels; needs `height`
    pub width: Option<u32>,

    /// Required image height in pixels; needs `width`
    pub height: Option<u32>,
}

/// Limits for multipart intake
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeSettings {
    /// Spool directory; the system temp directory when unset
    pub temp_dir: Option<PathBuf>,

    /// Largest accepted file part
    pub max_file_size: ByteSize,

    /// Largest accepted number of file parts per request
    pub max_files: usize,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            temp_dir: None,
            max_file_size: ByteSize(DEFAULT_MAX_FILE_SIZE),
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

/// Complete upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Language of rendered error messages
    #[serde(default = "default_language")]
    pub language: String,

    /// Storage settings
    #[serde(default)]
    pub storage: StorageSettings,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationSettings,

    /// Multipart intake settings
    #[serde(default)]
    pub intake: IntakeSettings,
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            storage: StorageSettings::default(),
            validation: ValidationSettings::default(),
            intake: IntakeSettings::default(),
        }
    }
}

impl UploadConfig {
    /// Environment variable prefix
    pub const ENV_PREFIX: &'static str = "ACTON_UPLOAD_";

    /// Local configuration file
    pub const LOCAL_FILE: &'static str = "upload.toml";

    /// Loads defaults, then `./upload.toml` if present, then the environment
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - `./upload.toml` exists but contains invalid TOML
    /// - A value has the wrong type
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use acton_upload::config::UploadConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// // ACTON_UPLOAD_STORAGE__DIRECTORY=/srv/files overrides storage.directory
    /// let config = UploadConfig::load()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load() -> anyhow::Result<Self> {
        let mut figment = Self::defaults()?;

        let local_config = PathBuf::from(Self::LOCAL_FILE);
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        let config = figment.merge(Self::environment()).extract()?;
        Ok(config)
    }

    /// Loads defaults, then the file at `path`, then the environment
    ///
    /// A missing file contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file contains invalid TOML or a value has the
    /// wrong type.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config = Self::defaults()?
            .merge(Toml::file(path.as_ref()))
            .merge(Self::environment())
            .extract()?;

        Ok(config)
    }

    fn defaults() -> anyhow::Result<Figment> {
        Ok(Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?)))
    }

    fn environment() -> Env {
        Env::prefixed(Self::ENV_PREFIX).split("__").lowercase(true)
    }

    /// Builds the configured rules, in a fixed order: extension, media type,
    /// size, dimensions
    #[must_use]
    pub fn validations(&self) -> Vec<Box<dyn ValidationRule>> {
        let settings = &self.validation;
        let mut rules: Vec<Box<dyn ValidationRule>> = Vec::new();

        if !settings.extensions.is_empty() {
            rules.push(Box::new(Extension::new(&settings.extensions)));
        }
        if !settings.mimetypes.is_empty() {
            rules.push(Box::new(Mimetype::new(&settings.mimetypes)));
        }
        if settings.max_size.is_some() || settings.min_size.is_some() {
            let max = settings.max_size.unwrap_or(ByteSize(u64::MAX));
            let min = settings.min_size.unwrap_or_default();
            rules.push(Box::new(Size::between(min, max)));
        }
        match (settings.width, settings.height) {
            (Some(width), Some(height)) => rules.push(Box::new(Dimensions::new(width, height))),
            (None, None) => {}
            _ => tracing::warn!("Ignoring dimension constraint: width and height must both be set"),
        }

        rules
    }

    /// Builds the configured storage backend
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is missing or not writable.
    pub fn storage(&self) -> StorageResult<Box<dyn StorageBackend>> {
        let settings = &self.storage;
        let local = FileSystemStorage::new(&settings.directory, settings.overwrite)?;

        if settings.hashed_names {
            Ok(Box::new(HashedFileSystemStorage::from(local)))
        } else {
            Ok(Box::new(local))
        }
    }

    /// Loads the configured language
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::UnknownLanguage`] if no table exists.
    pub fn translation(&self) -> Result<Translation, TranslationError> {
        Translation::new(&self.language)
    }

    /// Multipart intake options
    #[must_use]
    pub fn spool_options(&self) -> SpoolOptions {
        let intake = &self.intake;
        let options = SpoolOptions::default()
            .max_file_size(intake.max_file_size.bytes())
            .max_files(intake.max_files);

        match &intake.temp_dir {
            Some(dir) => options.temp_dir(dir),
            None => options,
        }
    }
}
