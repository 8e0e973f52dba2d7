//! File name sanitization
//!
//! Client-supplied file names are attacker controlled. Before a name is
//! stored on a [`FileInfo`](super::FileInfo) every character outside a small
//! ASCII allow-list is removed, runs of two or more dots are dropped, and only
//! the final path component survives.
//!
//! Allowed characters: ASCII letters and digits, `_`, space, `-`, `~`, `,`,
//! `;`, `:`, `[`, `]`, `(`, `)` and `.`. Non-ASCII characters are stripped.

use once_cell::sync::Lazy;
use regex::Regex;

static DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9_ ~,;:\[\]().-]").expect("Invalid regex")
});

static DOT_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.{2,}").expect("Invalid regex"));

/// Sanitizes a raw file name (without extension)
///
/// Never fails. Input made only of unsafe characters yields an empty string.
///
/// # Examples
///
/// ```rust
/// use acton_upload::file::sanitize_name;
///
/// assert_eq!(sanitize_name("../../etc/passwd"), "etcpasswd");
/// assert_eq!(sanitize_name("report (final)"), "report (final)");
/// assert_eq!(sanitize_name("<script>"), "script");
/// ```
#[must_use]
pub fn sanitize_name(raw: &str) -> String {
    let stripped = DISALLOWED.replace_all(raw, "");
    let collapsed = DOT_RUNS.replace_all(&stripped, "");
    let name = base_name(&collapsed);

    if name == "." {
        String::new()
    } else {
        name.to_string()
    }
}

/// Returns the last path component of `path`
///
/// Both `/` and `\` count as separators.
pub(crate) fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Splits a file name into name and extension
///
/// The extension is whatever follows the last `.` of the base name; a base
/// name without a dot has an empty extension.
pub(crate) fn split_name(path: &str) -> (&str, &str) {
    let base = base_name(path);
    base.rfind('.')
        .map_or((base, ""), |idx| (&base[..idx], &base[idx + 1..]))
}
