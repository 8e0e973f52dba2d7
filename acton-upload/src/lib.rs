//! acton-upload: validated file uploads with pluggable storage
//!
//! Takes the files a web server has already received into temporary
//! locations, checks them against declarative rules, and moves them into
//! durable storage only when every file of the submission passes.
//!
//! # Design Principles
//!
//! 1. **All or nothing**: a batch with a single invalid file stores nothing
//! 2. **Every error at once**: validation never stops at the first failure
//! 3. **Untrusted names**: client file names are sanitized before use
//! 4. **Content over claims**: media types are sniffed from the bytes
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use acton_upload::prelude::*;
//!
//! # fn example(form: &FileUploads) -> anyhow::Result<()> {
//! let storage = FileSystemStorage::new("/var/uploads", false)?;
//!
//! let mut batch = UploadBatch::from_form(form, "documents", storage)?;
//! batch
//!     .add_validation(Extension::new(["pdf", "txt"]))
//!     .add_validation(Size::new("5M"));
//!
//! match batch.upload() {
//!     Ok(stored) => {
//!         for file in stored {
//!             println!("{} -> {}", file.filename, file.storage_path.display());
//!         }
//!     }
//!     Err(_) => {
//!         for error in batch.errors() {
//!             eprintln!("{error}");
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`intake`]: decoded form input and async multipart spooling
//! - [`file`]: per-file metadata and name sanitization
//! - [`validation`]: rules and the errors they report
//! - [`storage`]: backends that persist validated files
//! - [`upload`]: the batch orchestrator and its lifecycle hooks
//! - [`translation`]: localized error messages
//! - [`config`]: figment-based configuration
//! - [`observability`]: tracing subscriber setup

// Lint configuration is handled at the workspace level in Cargo.toml
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod file;
pub mod intake;
pub mod observability;
pub mod storage;
pub mod translation;
pub mod upload;
pub mod validation;

#[cfg(test)]
pub mod testing;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! # Examples
    //!
    //! ```rust
    //! use acton_upload::prelude::*;
    //! ```

    // Input
    pub use crate::intake::{FileDescriptor, FileUploads, TempDirChannel, UploadChannel, UploadErrorCode};

    // Files
    pub use crate::file::{FileInfo, HashAlgorithm};

    // Validation
    pub use crate::validation::{
        ByteSize, Dimensions, Extension, MediaType, Mimetype, Size, ValidationError, ValidationRule,
    };

    // Storage
    pub use crate::storage::{
        FileSystemStorage, HashedFileSystemStorage, StorageBackend, StorageError, StoredFile,
    };

    // Orchestration
    pub use crate::upload::{FileError, PerFile, UploadBatch};

    // Messages and configuration
    pub use crate::config::UploadConfig;
    pub use crate::translation::Translation;

    // Error types
    pub use crate::error::{InputError, MessageTemplate, UploadError};
}
