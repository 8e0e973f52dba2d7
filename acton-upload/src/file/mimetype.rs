//! Content-based media type detection
//!
//! The media type of an upload is derived from the bytes on disk, never from
//! the client-supplied file name or `Content-Type` header. Magic numbers are
//! matched with the `infer` crate; content without a known signature is
//! classified as empty, plain text, or opaque binary.
//!
//! # Examples
//!
//! ```rust
//! use acton_upload::file::mimetype::detect;
//!
//! assert_eq!(detect(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]), "image/png");
//! assert_eq!(detect(b"hello world"), "text/plain");
//! assert_eq!(detect(&[0xFF, 0x00, 0xFE, 0x01]), "application/octet-stream");
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Number of leading bytes inspected when sniffing a file
pub const SNIFF_LEN: u64 = 8192;

/// Media type reported for zero-length files
pub const EMPTY: &str = "application/x-empty";

/// Media type reported for valid UTF-8 content without a signature
pub const TEXT_PLAIN: &str = "text/plain";

/// Media type reported for binary content without a signature
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Detects the media type of a file on disk
///
/// Reads at most [`SNIFF_LEN`] bytes.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn sniff_path(path: &Path) -> io::Result<String> {
    let mut head = Vec::with_capacity(usize::try_from(SNIFF_LEN).unwrap_or(8192));
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut head)?;
    Ok(normalize(detect(&head)))
}

/// Detects the media type of an in-memory buffer
#[must_use]
pub fn detect(head: &[u8]) -> &'static str {
    if let Some(kind) = infer::get(head) {
        return kind.mime_type();
    }
    if head.is_empty() {
        return EMPTY;
    }
    if looks_like_text(head) {
        TEXT_PLAIN
    } else {
        OCTET_STREAM
    }
}

/// Keeps the first `;`- or `,`-delimited token, trimmed and lower-cased
///
/// ```rust
/// use acton_upload::file::mimetype::normalize;
///
/// assert_eq!(normalize("Text/Plain; charset=us-ascii"), "text/plain");
/// assert_eq!(normalize("image/png, image/apng"), "image/png");
/// ```
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.split([';', ','])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// UTF-8 text without control characters other than whitespace
///
/// A multi-byte sequence cut off by the sniff window still counts as text.
fn looks_like_text(head: &[u8]) -> bool {
    let valid = match std::str::from_utf8(head) {
        Ok(text) => text,
        Err(err) if err.error_len().is_none() => {
            // Truncated at the end of the window
            match std::str::from_utf8(&head[..err.valid_up_to()]) {
                Ok(text) => text,
                Err(_) => return false,
            }
        }
        Err(_) => return false,
    };

    valid
        .chars()
        .all(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t' | '\x0C'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    const GIF_MAGIC: &[u8] = b"GIF89a";
    const PDF_MAGIC: &[u8] = b"%PDF-1.4";

    #[test]
    fn test_detect_signatures() {
        assert_eq!(detect(JPEG_MAGIC), "image/jpeg");
        assert_eq!(detect(PNG_MAGIC), "image/png");
        assert_eq!(detect(GIF_MAGIC), "image/gif");
        assert_eq!(detect(PDF_MAGIC), "application/pdf");
    }

    #[test]
    fn test_detect_fallbacks() {
        assert_eq!(detect(b""), EMPTY);
        assert_eq!(detect(b"Lorem ipsum dolor sit amet\n"), TEXT_PLAIN);
        assert_eq!(detect(&[0x00, 0x01, 0x02, 0x03]), OCTET_STREAM);
    }

    #[test]
    fn test_truncated_utf8_is_text() {
        // "é" is 0xC3 0xA9; cut after the first byte
        assert_eq!(detect(&[b'c', b'a', b'f', 0xC3]), TEXT_PLAIN);
    }

    #[test]
    fn test_sniff_ignores_file_name() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"just some text").unwrap();

        assert_eq!(sniff_path(file.path()).unwrap(), "text/plain");
    }

    #[test]
    fn test_sniff_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(sniff_path(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("IMAGE/JPEG"), "image/jpeg");
        assert_eq!(normalize(" text/html ; charset=utf-8"), "text/html");
    }
}
