//! Multipart request spooling
//!
//! Streams a `multipart/form-data` body to disk, one temp file per file part,
//! and produces the [`FileUploads`] a batch consumes. Transfer problems are
//! reported through [`UploadErrorCode`] on the affected descriptor rather
//! than failing the whole request:
//!
//! - a part larger than [`SpoolOptions::max_file_size`] is discarded and
//!   marked [`UploadErrorCode::ExceedsFormLimit`]
//! - a part with an empty file name and no content is
//!   [`UploadErrorCode::NoFile`]
//! - a temp file that cannot be created is [`UploadErrorCode::NoTmpDir`],
//!   one that cannot be written is [`UploadErrorCode::WriteFailed`]
//!
//! Malformed bodies and too many file parts fail with [`InputError`]; any
//! temp file written so far is removed.
//!
//! # Examples
//!
//! ```rust,no_run
//! use acton_upload::intake::{spool_request, SpoolOptions};
//! use bytes::Bytes;
//! use futures_util::stream;
//!
//! # async fn example(body: Bytes) -> Result<(), acton_upload::error::InputError> {
//! let body = stream::once(async move { Ok::<_, std::io::Error>(body) });
//! let form = spool_request(
//!     "multipart/form-data; boundary=X-BOUNDARY",
//!     body,
//!     &SpoolOptions::default().max_files(4),
//! )
//! .await?;
//!
//! for descriptor in form.uploads.descriptors("attachments")? {
//!     println!("{} -> {}", descriptor.declared_name, descriptor.temp_path.display());
//! }
//!
//! // Remove whatever was not moved away by a storage backend
//! form.files.cleanup()?;
//! # Ok(())
//! # }
//! ```

use super::{FileDescriptor, FileUploads, SpooledFiles, UploadChannel, UploadErrorCode};
use crate::error::InputError;
use bytes::Bytes;
use futures_util::Stream;
use multer::{Field, Multipart};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Default maximum file size (10MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default maximum number of file parts in one request
pub const DEFAULT_MAX_FILES: usize = 10;

/// Limits and location for spooled uploads
#[derive(Debug, Clone)]
pub struct SpoolOptions {
    /// Directory temp files are written to
    pub temp_dir: PathBuf,
    /// Largest accepted file part, in bytes
    pub max_file_size: u64,
    /// Largest accepted number of file parts
    pub max_files: usize,
}

impl Default for SpoolOptions {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

impl SpoolOptions {
    /// Sets the temp directory
    #[must_use]
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Sets the per-file size limit
    #[must_use]
    pub const fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Sets the file count limit
    #[must_use]
    pub const fn max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }
}

/// A spooled request: the decoded form plus the temp files backing it
#[derive(Debug)]
pub struct SpooledForm {
    /// Decoded form; its channel is [`files`](Self::files)
    pub uploads: FileUploads,
    /// Temp files written for this request
    pub files: Arc<SpooledFiles>,
}

/// Spools a multipart body whose boundary is taken from `content_type`
///
/// # Errors
///
/// Fails when the header carries no boundary, or as [`spool`] does.
pub async fn spool_request<S, O, E>(
    content_type: &str,
    stream: S,
    options: &SpoolOptions,
) -> Result<SpooledForm, InputError>
where
    S: Stream<Item = Result<O, E>> + Send + 'static,
    O: Into<Bytes> + 'static,
    E: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
    let boundary = multer::parse_boundary(content_type)?;
    spool(stream, boundary, options).await
}

/// Spools every file part of a multipart body to `options.temp_dir`
///
/// Parts without a file name (plain form fields) are skipped. A trailing
/// `[]` on a field name is dropped, so `docs[]` and `docs` share a field.
///
/// # Errors
///
/// Fails on a malformed body, more than `options.max_files` file parts, or
/// an I/O error outside a single part's transfer.
pub async fn spool<S, O, E>(
    stream: S,
    boundary: impl Into<String>,
    options: &SpoolOptions,
) -> Result<SpooledForm, InputError>
where
    S: Stream<Item = Result<O, E>> + Send + 'static,
    O: Into<Bytes> + 'static,
    E: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
    let files = Arc::new(SpooledFiles::new());
    let channel: Arc<dyn UploadChannel> = files.clone();
    let mut uploads = FileUploads::new(channel);

    let multipart = Multipart::new(stream, boundary);
    if let Err(err) = read_parts(multipart, options, &files, &mut uploads).await {
        tracing::warn!(error = %err, "Multipart spooling failed");
        if let Err(cleanup) = files.cleanup() {
            tracing::warn!(error = %cleanup, "Could not remove spooled uploads");
        }
        return Err(err);
    }

    Ok(SpooledForm { uploads, files })
}

async fn read_parts(
    mut multipart: Multipart<'static>,
    options: &SpoolOptions,
    files: &SpooledFiles,
    uploads: &mut FileUploads,
) -> Result<(), InputError> {
    let mut count = 0;

    while let Some(mut field) = multipart.next_field().await? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let key = field.name().map(field_key).unwrap_or_default().to_string();

        count += 1;
        if count > options.max_files {
            return Err(InputError::TooManyFiles {
                max: options.max_files,
            });
        }

        let descriptor = spool_part(&mut field, file_name, options, files).await?;
        tracing::debug!(
            field = %key,
            file = %descriptor.declared_name,
            size = ?descriptor.size,
            error = descriptor.error.code(),
            "Spooled file part"
        );
        uploads.push(key, descriptor);
    }

    Ok(())
}

async fn spool_part(
    field: &mut Field<'static>,
    file_name: String,
    options: &SpoolOptions,
    files: &SpooledFiles,
) -> Result<FileDescriptor, InputError> {
    let temp = tempfile::Builder::new()
        .prefix("upload-")
        .tempfile_in(&options.temp_dir);
    let temp = match temp {
        Ok(temp) => temp,
        Err(err) => {
            tracing::warn!(dir = %options.temp_dir.display(), error = %err, "Cannot create temp file");
            drain(field).await?;
            return Ok(FileDescriptor::failed(file_name, UploadErrorCode::NoTmpDir));
        }
    };

    let (std_file, path) = temp.keep().map_err(|e| InputError::Io(e.error))?;
    files.register(&path);

    let mut file = tokio::fs::File::from_std(std_file);
    let mut size: u64 = 0;
    let mut outcome = UploadErrorCode::Ok;

    while let Some(chunk) = field.chunk().await? {
        if !outcome.is_ok() {
            continue;
        }

        size = size.saturating_add(u64::try_from(chunk.len()).unwrap_or(u64::MAX));
        if size > options.max_file_size {
            outcome = UploadErrorCode::ExceedsFormLimit;
            continue;
        }

        if let Err(err) = file.write_all(&chunk).await {
            tracing::warn!(path = %path.display(), error = %err, "Cannot write temp file");
            outcome = UploadErrorCode::WriteFailed;
        }
    }

    if outcome.is_ok() {
        if let Err(err) = file.flush().await {
            tracing::warn!(path = %path.display(), error = %err, "Cannot flush temp file");
            outcome = UploadErrorCode::WriteFailed;
        }
    }
    drop(file);

    if outcome.is_ok() && file_name.is_empty() && size == 0 {
        outcome = UploadErrorCode::NoFile;
    }

    if !outcome.is_ok() {
        discard(&path, files).await;
        return Ok(FileDescriptor::failed(file_name, outcome));
    }

    Ok(FileDescriptor::new(path, file_name).with_size(size))
}

async fn drain(field: &mut Field<'static>) -> Result<(), InputError> {
    while field.chunk().await?.is_some() {}
    Ok(())
}

async fn discard(path: &Path, files: &SpooledFiles) {
    files.forget(path);
    if let Err(err) = tokio::fs::remove_file(path).await {
        tracing::debug!(path = %path.display(), error = %err, "Could not remove discarded part");
    }
}

fn field_key(name: &str) -> &str {
    name.strip_suffix("[]").unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;
    use tempfile::TempDir;

    const BOUNDARY: &str = "X-ACTON-BOUNDARY";

    enum Part<'a> {
        File(&'a str, &'a str, &'a [u8]),
        Text(&'a str, &'a str),
    }

    fn body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut out = Vec::new();
        for part in parts {
            let mut head = format!("--{BOUNDARY}\r\n");
            match part {
                Part::File(name, file_name, content) => {
                    write!(
                        head,
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n"
                    )
                    .unwrap();
                    head.push_str("Content-Type: application/octet-stream\r\n\r\n");
                    out.extend_from_slice(head.as_bytes());
                    out.extend_from_slice(content);
                }
                Part::Text(name, value) => {
                    write!(head, "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").unwrap();
                    out.extend_from_slice(head.as_bytes());
                    out.extend_from_slice(value.as_bytes());
                }
            }
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        out
    }

    async fn spool_parts(parts: &[Part<'_>], options: &SpoolOptions) -> Result<SpooledForm, InputError> {
        let data = Bytes::from(body(parts));
        let stream = futures_util::stream::once(async move { Ok::<_, std::io::Error>(data) });
        spool(stream, BOUNDARY, options).await
    }

    #[tokio::test]
    async fn test_spools_file_parts() {
        let dir = TempDir::new().unwrap();
        let options = SpoolOptions::default().temp_dir(dir.path());

        let form = spool_parts(
            &[
                Part::Text("title", "holiday"),
                Part::File("photo", "beach.txt", b"sand and sea"),
            ],
            &options,
        )
        .await
        .unwrap();

        assert!(!form.uploads.contains("title"));
        let descriptors = form.uploads.descriptors("photo").unwrap();
        assert_eq!(descriptors.len(), 1);

        let photo = &descriptors[0];
        assert_eq!(photo.declared_name, "beach.txt");
        assert_eq!(photo.size, Some(12));
        assert!(photo.error.is_ok());
        assert_eq!(std::fs::read(&photo.temp_path).unwrap(), b"sand and sea");
        assert!(form.uploads.channel().is_uploaded_file(&photo.temp_path));
    }

    #[tokio::test]
    async fn test_repeated_field_becomes_multi_file() {
        let dir = TempDir::new().unwrap();
        let options = SpoolOptions::default().temp_dir(dir.path());

        let form = spool_parts(
            &[
                Part::File("docs[]", "a.txt", b"A"),
                Part::File("docs[]", "b.txt", b"BB"),
            ],
            &options,
        )
        .await
        .unwrap();

        let names: Vec<_> = form
            .uploads
            .descriptors("docs")
            .unwrap()
            .iter()
            .map(|d| d.declared_name.clone())
            .collect();
        assert_eq!(names, ["a.txt", "b.txt"]);
        assert_eq!(form.files.len(), 2);
    }

    #[tokio::test]
    async fn test_oversized_part_is_marked_and_removed() {
        let dir = TempDir::new().unwrap();
        let options = SpoolOptions::default().temp_dir(dir.path()).max_file_size(4);

        let form = spool_parts(&[Part::File("big", "big.bin", b"0123456789")], &options)
            .await
            .unwrap();

        let big = &form.uploads.descriptors("big").unwrap()[0];
        assert_eq!(big.error, UploadErrorCode::ExceedsFormLimit);
        assert!(form.files.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_empty_file_input_is_no_file() {
        let dir = TempDir::new().unwrap();
        let options = SpoolOptions::default().temp_dir(dir.path());

        let form = spool_parts(&[Part::File("avatar", "", b"")], &options)
            .await
            .unwrap();

        assert_eq!(
            form.uploads.descriptors("avatar").unwrap()[0].error,
            UploadErrorCode::NoFile
        );
    }

    #[tokio::test]
    async fn test_missing_temp_dir() {
        let dir = TempDir::new().unwrap();
        let options = SpoolOptions::default().temp_dir(dir.path().join("gone"));

        let form = spool_parts(&[Part::File("f", "a.txt", b"data")], &options)
            .await
            .unwrap();

        assert_eq!(
            form.uploads.descriptors("f").unwrap()[0].error,
            UploadErrorCode::NoTmpDir
        );
    }

    #[tokio::test]
    async fn test_too_many_files_cleans_up() {
        let dir = TempDir::new().unwrap();
        let options = SpoolOptions::default().temp_dir(dir.path()).max_files(1);

        let err = spool_parts(
            &[Part::File("f", "a.txt", b"1"), Part::File("f", "b.txt", b"2")],
            &options,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, InputError::TooManyFiles { max: 1 }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_spool_request_requires_boundary() {
        let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(Bytes::new()) });
        let err = spool_request("text/plain", stream, &SpoolOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InputError::Multipart(_)));
    }

    #[test]
    fn test_field_key_strips_brackets() {
        assert_eq!(field_key("docs[]"), "docs");
        assert_eq!(field_key("docs"), "docs");
    }
}
