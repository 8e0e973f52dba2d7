//! Batch validation and all-or-nothing upload
//!
//! An [`UploadBatch`] owns every file submitted under one form field, the
//! rules they must satisfy, and the backend that stores them.
//!
//! - [`validate`](UploadBatch::validate) runs every rule against every file
//!   in submission order and records each failure as `"{file}: {reason}"`.
//!   A failing file never stops its siblings or its remaining rules.
//! - [`upload`](UploadBatch::upload) stores nothing unless the whole batch
//!   is valid, then hands the files to the backend one by one.
//!
//! Four hooks observe the pipeline, each receiving the file being processed:
//! before and after validation, before and after storage.
//!
//! # Examples
//!
//! ```rust,no_run
//! use acton_upload::intake::FileUploads;
//! use acton_upload::storage::FileSystemStorage;
//! use acton_upload::upload::UploadBatch;
//! use acton_upload::validation::{Mimetype, Size};
//!
//! # fn example(form: &FileUploads) -> anyhow::Result<()> {
//! let storage = FileSystemStorage::new("/var/uploads", false)?;
//!
//! let mut batch = UploadBatch::from_form(form, "avatar", storage)?;
//! batch
//!     .add_validation(Mimetype::new(["image/png", "image/jpeg"]))
//!     .add_validation(Size::new("2M"))
//!     .before_upload(|file| {
//!         file.set_name("avatar");
//!     });
//!
//! match batch.upload() {
//!     Ok(stored) => println!("stored {} file(s)", stored.len()),
//!     Err(_) => {
//!         for error in batch.errors() {
//!             eprintln!("{error}");
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod per_file;

pub use per_file::PerFile;

use crate::error::{InputError, MessageTemplate, Result, UploadError};
use crate::file::{sanitize_name, Dimensions, FileInfo};
use crate::intake::{FileDescriptor, FileUploads, UploadChannel};
use crate::storage::{StorageBackend, StoredFile};
use crate::translation::Translation;
use crate::validation::{ValidationError, ValidationRule};
use std::fmt;
use std::io;
use std::ops::Index;
use std::sync::Arc;

/// A lifecycle hook
pub type Hook = Box<dyn FnMut(&mut FileInfo) + Send>;

/// One recorded failure: the file it concerns and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    file: String,
    reason: MessageTemplate,
}

impl FileError {
    /// Creates an error about `file`
    #[must_use]
    pub fn new(file: impl Into<String>, reason: MessageTemplate) -> Self {
        Self {
            file: file.into(),
            reason,
        }
    }

    /// Name (with extension) of the file concerned
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Why the file failed
    #[must_use]
    pub const fn reason(&self) -> &MessageTemplate {
        &self.reason
    }

    /// Renders this error with a localized reason
    #[must_use]
    pub fn translate(&self, translation: &Translation) -> String {
        format!("{}: {}", self.file, translation.render(&self.reason))
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.reason)
    }
}

#[derive(Default)]
struct Hooks {
    before_validate: Option<Hook>,
    after_validate: Option<Hook>,
    before_upload: Option<Hook>,
    after_upload: Option<Hook>,
}

fn run(hook: &mut Option<Hook>, file: &mut FileInfo) {
    if let Some(hook) = hook {
        hook(file);
    }
}

/// Files submitted under one form field, with their rules and storage
pub struct UploadBatch<S> {
    files: Vec<FileInfo>,
    rules: Vec<Box<dyn ValidationRule>>,
    errors: Vec<FileError>,
    hooks: Hooks,
    storage: S,
}

impl<S: StorageBackend> UploadBatch<S> {
    /// Creates a batch from decoded descriptors
    ///
    /// Descriptors whose transfer failed produce an error right away and no
    /// file; they are never validated or stored.
    #[must_use]
    pub fn new(descriptors: &[FileDescriptor], storage: S, channel: Arc<dyn UploadChannel>) -> Self {
        Self::with_factory(descriptors, storage, channel, FileInfo::from_descriptor)
    }

    /// Creates a batch, building each [`FileInfo`] with `factory`
    #[must_use]
    pub fn with_factory<F>(
        descriptors: &[FileDescriptor],
        storage: S,
        channel: Arc<dyn UploadChannel>,
        factory: F,
    ) -> Self
    where
        F: Fn(&FileDescriptor, Arc<dyn UploadChannel>) -> FileInfo,
    {
        let mut files = Vec::with_capacity(descriptors.len());
        let mut errors = Vec::new();

        for descriptor in descriptors {
            if descriptor.error.is_ok() {
                files.push(factory(descriptor, Arc::clone(&channel)));
            } else {
                let name = sanitize_name(&descriptor.declared_name);
                tracing::debug!(file = %name, code = descriptor.error.code(), "Upload failed in transfer");
                errors.push(FileError::new(
                    name,
                    ValidationError::UploadChannel(descriptor.error).template(),
                ));
            }
        }

        Self {
            files,
            rules: Vec::new(),
            errors,
            hooks: Hooks::default(),
            storage,
        }
    }

    /// Creates a batch from the files submitted under `key`
    ///
    /// # Errors
    ///
    /// Returns [`InputError::MissingField`] if the form has no such field.
    pub fn from_form(form: &FileUploads, key: &str, storage: S) -> std::result::Result<Self, InputError> {
        let descriptors = form.descriptors(key)?;
        Ok(Self::new(descriptors, storage, form.channel()))
    }

    /// Appends a rule
    pub fn add_validation(&mut self, rule: impl ValidationRule + 'static) -> &mut Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Appends several rules, keeping their order
    pub fn add_validations<I>(&mut self, rules: I) -> &mut Self
    where
        I: IntoIterator<Item = Box<dyn ValidationRule>>,
    {
        self.rules.extend(rules);
        self
    }

    /// Rules in application order
    #[must_use]
    pub fn validations(&self) -> &[Box<dyn ValidationRule>] {
        &self.rules
    }

    /// Runs every rule against every file
    ///
    /// For each file, in order: the before-validate hook, the upload channel
    /// check, every rule, the after-validate hook. A file that did not come
    /// through the upload channel skips its rules and its after-validate
    /// hook.
    ///
    /// Errors accumulate across calls; see [`clear_errors`](Self::clear_errors).
    /// Returns `true` if no error is recorded.
    pub fn validate(&mut self) -> bool {
        let span = tracing::debug_span!("upload.validate", files = self.files.len());
        let _guard = span.enter();

        let Self {
            files,
            rules,
            errors,
            hooks,
            ..
        } = self;

        for file in files.iter_mut() {
            run(&mut hooks.before_validate, file);

            if !file.is_uploaded_file() {
                tracing::warn!(file = %file.name_with_extension(), path = %file.path().display(), "Not an uploaded file");
                errors.push(FileError::new(
                    file.name_with_extension(),
                    ValidationError::NotUploaded.template(),
                ));
                continue;
            }

            for rule in rules.iter() {
                if let Err(err) = rule.validate(file) {
                    tracing::debug!(file = %file.name_with_extension(), error = %err, "Validation failed");
                    errors.push(FileError::new(file.name_with_extension(), err.template()));
                }
            }

            run(&mut hooks.after_validate, file);
        }

        errors.is_empty()
    }

    /// Same as [`validate`](Self::validate)
    pub fn is_valid(&mut self) -> bool {
        self.validate()
    }

    /// Validates, then stores every file in order
    ///
    /// Nothing is stored unless the whole batch is valid. If the backend
    /// fails partway, files stored before the failure stay where they are;
    /// the failure is also recorded as a batch error.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::ValidationFailed`] if any error is recorded and
    /// [`UploadError::Storage`] on the first storage failure.
    pub fn upload(&mut self) -> Result<Vec<StoredFile>> {
        if !self.validate() {
            tracing::warn!(errors = self.errors.len(), "Refusing upload of invalid batch");
            return Err(UploadError::ValidationFailed {
                errors: self.errors(),
            });
        }

        let span = tracing::info_span!("upload.store", files = self.files.len());
        let _guard = span.enter();

        let Self {
            files,
            errors,
            hooks,
            storage,
            ..
        } = self;
        let mut stored = Vec::with_capacity(files.len());

        for file in files.iter_mut() {
            run(&mut hooks.before_upload, file);

            match storage.store(file) {
                Ok(outcome) => stored.push(outcome),
                Err(err) => {
                    tracing::warn!(
                        file = %file.name_with_extension(),
                        stored = stored.len(),
                        error = %err,
                        "Storage failed; files stored earlier are kept"
                    );
                    errors.push(FileError::new(file.name_with_extension(), err.template()));
                    return Err(err.into());
                }
            }

            run(&mut hooks.after_upload, file);
        }

        Ok(stored)
    }

    /// Sets the hook run before each file is validated
    pub fn before_validate(&mut self, hook: impl FnMut(&mut FileInfo) + Send + 'static) -> &mut Self {
        self.hooks.before_validate = Some(Box::new(hook));
        self
    }

    /// Sets the hook run after each uploaded file is validated
    pub fn after_validate(&mut self, hook: impl FnMut(&mut FileInfo) + Send + 'static) -> &mut Self {
        self.hooks.after_validate = Some(Box::new(hook));
        self
    }

    /// Sets the hook run before each file is stored
    pub fn before_upload(&mut self, hook: impl FnMut(&mut FileInfo) + Send + 'static) -> &mut Self {
        self.hooks.before_upload = Some(Box::new(hook));
        self
    }

    /// Sets the hook run after each file is stored
    pub fn after_upload(&mut self, hook: impl FnMut(&mut FileInfo) + Send + 'static) -> &mut Self {
        self.hooks.after_upload = Some(Box::new(hook));
        self
    }

    /// The storage backend
    pub const fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S> UploadBatch<S> {
    /// Recorded errors as `"{file}: {reason}"`, in order
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Recorded errors with their file and reason kept apart
    #[must_use]
    pub fn file_errors(&self) -> &[FileError] {
        &self.errors
    }

    /// Recorded errors with localized reasons
    #[must_use]
    pub fn translated_errors(&self, translation: &Translation) -> Vec<String> {
        self.errors
            .iter()
            .map(|error| error.translate(translation))
            .collect()
    }

    /// Records an error about `file`
    pub fn add_error(&mut self, file: impl Into<String>, reason: MessageTemplate) -> &mut Self {
        self.errors.push(FileError::new(file, reason));
        self
    }

    /// Forgets every recorded error, including transfer failures
    pub fn clear_errors(&mut self) -> &mut Self {
        self.errors.clear();
        self
    }

    /// Number of files (transfer failures excluded)
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the batch holds no file
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// File at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FileInfo> {
        self.files.get(index)
    }

    /// Mutable file at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut FileInfo> {
        self.files.get_mut(index)
    }

    /// Files in submission order
    pub fn iter(&self) -> std::slice::Iter<'_, FileInfo> {
        self.files.iter()
    }

    /// Mutable files in submission order
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, FileInfo> {
        self.files.iter_mut()
    }

    /// Asks every file the same question
    pub fn each<T>(&self, f: impl FnMut(&FileInfo) -> T) -> PerFile<T> {
        self.files.iter().map(f).collect()
    }

    /// Names without extension
    #[must_use]
    pub fn name(&self) -> PerFile<String> {
        self.each(|file| file.name().to_string())
    }

    /// Extensions
    #[must_use]
    pub fn extension(&self) -> PerFile<String> {
        self.each(|file| file.extension().to_string())
    }

    /// Names with extension
    #[must_use]
    pub fn name_with_extension(&self) -> PerFile<String> {
        self.each(FileInfo::name_with_extension)
    }

    /// Sizes in bytes
    #[must_use]
    pub fn size(&self) -> PerFile<io::Result<u64>> {
        self.each(FileInfo::size)
    }

    /// Sniffed media types
    #[must_use]
    pub fn mimetype(&self) -> PerFile<io::Result<String>> {
        self.each(|file| file.mimetype().map(str::to_string))
    }

    /// MD5 digests
    #[must_use]
    pub fn md5(&self) -> PerFile<io::Result<String>> {
        self.each(FileInfo::md5)
    }

    /// Image dimensions
    #[must_use]
    pub fn dimensions(&self) -> PerFile<Option<Dimensions>> {
        self.each(FileInfo::dimensions)
    }
}

impl<S> Index<usize> for UploadBatch<S> {
    type Output = FileInfo;

    fn index(&self, index: usize) -> &FileInfo {
        &self.files[index]
    }
}

impl<'a, S> IntoIterator for &'a UploadBatch<S> {
    type Item = &'a FileInfo;
    type IntoIter = std::slice::Iter<'a, FileInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

impl<S: fmt::Debug> fmt::Debug for UploadBatch<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadBatch")
            .field("files", &self.files)
            .field("rules", &self.rules.len())
            .field("errors", &self.errors)
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}
