//! File size bounds and human-readable sizes

use super::{ValidationError, ValidationRule};
use crate::file::FileInfo;
use serde::{Deserialize, Serialize};
use std::fmt;

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

/// Converts a human-readable size to bytes
///
/// The leading digits are the quantity and the last character selects the
/// unit: `b`, `k`, `m`, or `g` (case-insensitive, powers of 1024). Any other
/// last character counts as bytes, so `"100F"` is 100 and `"5MB"` is 5.
/// Input without leading digits is 0; quantities too large for `u64`
/// saturate.
///
/// ```rust
/// use acton_upload::validation::parse_human_size;
///
/// assert_eq!(parse_human_size("100"), 100);
/// assert_eq!(parse_human_size("100K"), 102_400);
/// assert_eq!(parse_human_size("100M"), 104_857_600);
/// assert_eq!(parse_human_size("100G"), 107_374_182_400);
/// assert_eq!(parse_human_size("100F"), 100);
/// ```
#[must_use]
pub fn parse_human_size(input: &str) -> u64 {
    let input = input.trim_start();
    let digits_end = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let digits = &input[..digits_end];

    let quantity = if digits.is_empty() {
        0
    } else {
        digits.parse::<u64>().unwrap_or(u64::MAX)
    };

    let unit = match input.chars().last().map(|c| c.to_ascii_lowercase()) {
        Some('k') => KIB,
        Some('m') => MIB,
        Some('g') => GIB,
        _ => 1,
    };

    quantity.saturating_mul(unit)
}

/// A byte count, given as an integer or a human-readable string
///
/// Deserializes from either form:
///
/// ```rust
/// use acton_upload::validation::ByteSize;
///
/// let sizes: Vec<ByteSize> = serde_json::from_str(r#"[2048, "2K"]"#).unwrap();
/// assert_eq!(sizes[0], sizes[1]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "ByteSizeRepr", into = "u64")]
pub struct ByteSize(pub u64);

impl ByteSize {
    /// Number of bytes
    #[must_use]
    pub const fn bytes(self) -> u64 {
        self.0
    }
}

impl From<u64> for ByteSize {
    fn from(bytes: u64) -> Self {
        Self(bytes)
    }
}

impl From<&str> for ByteSize {
    fn from(human: &str) -> Self {
        Self(parse_human_size(human))
    }
}

impl From<String> for ByteSize {
    fn from(human: String) -> Self {
        Self::from(human.as_str())
    }
}

impl From<ByteSize> for u64 {
    fn from(size: ByteSize) -> Self {
        size.0
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ByteSizeRepr {
    Bytes(u64),
    Human(String),
}

impl From<ByteSizeRepr> for ByteSize {
    fn from(repr: ByteSizeRepr) -> Self {
        match repr {
            ByteSizeRepr::Bytes(bytes) => Self(bytes),
            ByteSizeRepr::Human(human) => Self::from(human),
        }
    }
}

/// Accepts files whose size lies within `min..=max`
///
/// ```rust
/// use acton_upload::validation::Size;
///
/// let rule = Size::new("5M").with_min(1024_u64);
/// assert_eq!(rule.max(), 5 * 1024 * 1024);
/// assert_eq!(rule.min(), 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    min: u64,
    max: u64,
}

impl Size {
    /// Creates a rule with an upper bound and no lower bound
    #[must_use]
    pub fn new(max: impl Into<ByteSize>) -> Self {
        Self {
            min: 0,
            max: max.into().bytes(),
        }
    }

    /// Creates a rule with both bounds
    #[must_use]
    pub fn between(min: impl Into<ByteSize>, max: impl Into<ByteSize>) -> Self {
        Self::new(max).with_min(min)
    }

    /// Sets the lower bound
    #[must_use]
    pub fn with_min(mut self, min: impl Into<ByteSize>) -> Self {
        self.min = min.into().bytes();
        self
    }

    /// Lower bound in bytes, inclusive
    #[must_use]
    pub const fn min(&self) -> u64 {
        self.min
    }

    /// Upper bound in bytes, inclusive
    #[must_use]
    pub const fn max(&self) -> u64 {
        self.max
    }
}

impl ValidationRule for Size {
    fn validate(&self, file: &FileInfo) -> Result<(), ValidationError> {
        let size = file.size()?;

        if size < self.min {
            return Err(ValidationError::TooSmall {
                size,
                min: self.min,
            });
        }
        if size > self.max {
            return Err(ValidationError::TooLarge {
                size,
                max: self.max,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::FileDescriptor;
    use crate::testing::{trusting, uploaded, write_fixture};
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn sized(size: u64) -> FileInfo {
        let descriptor = FileDescriptor::new("/nonexistent/upload", "a.bin").with_size(size);
        FileInfo::from_descriptor(&descriptor, trusting())
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_human_size("100"), 100);
        assert_eq!(parse_human_size("100b"), 100);
        assert_eq!(parse_human_size("100k"), 102_400);
        assert_eq!(parse_human_size("100K"), 102_400);
        assert_eq!(parse_human_size("100M"), 104_857_600);
        assert_eq!(parse_human_size("100G"), 107_374_182_400);
    }

    #[test]
    fn test_parse_quirks() {
        assert_eq!(parse_human_size("100F"), 100);
        assert_eq!(parse_human_size("5MB"), 5);
        assert_eq!(parse_human_size("  2k"), 2048);
        assert_eq!(parse_human_size(""), 0);
        assert_eq!(parse_human_size("K"), 0);
        assert_eq!(parse_human_size("99999999999999999999999G"), u64::MAX);
    }

    #[test]
    fn test_bounds_inclusive() {
        let rule = Size::between(10_u64, 20_u64);

        assert!(rule.validate(&sized(10)).is_ok());
        assert!(rule.validate(&sized(20)).is_ok());
        assert!(matches!(
            rule.validate(&sized(9)),
            Err(ValidationError::TooSmall { size: 9, min: 10 })
        ));
        assert!(matches!(
            rule.validate(&sized(21)),
            Err(ValidationError::TooLarge { size: 21, max: 20 })
        ));
    }

    #[test]
    fn test_messages() {
        let rule = Size::between("1K", "2K");

        let err = rule.validate(&sized(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "File size is too small. Must be greater than or equal to: 1024"
        );

        let err = rule.validate(&sized(5000)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "File size is too large. Must be less than or equal to: 2048"
        );
    }

    #[test]
    fn test_size_read_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(dir.path(), "tmp", b"12345");

        assert!(Size::new(5_u64).validate(&uploaded(&path, "a.txt")).is_ok());
        assert!(Size::new(4_u64).validate(&uploaded(&path, "a.txt")).is_err());
    }

    #[test]
    fn test_byte_size_deserialize() {
        let sizes: Vec<ByteSize> = serde_json::from_str(r#"[512, "1k", "3M"]"#).unwrap();
        assert_eq!(sizes, [ByteSize(512), ByteSize(1024), ByteSize(3 * MIB)]);
        assert_eq!(serde_json::to_string(&ByteSize(7)).unwrap(), "7");
    }

    proptest! {
        #[test]
        fn prop_passes_iff_within_bounds(min in 0u64..1000, span in 0u64..1000, size in 0u64..3000) {
            let max = min + span;
            let passed = Size::between(min, max).validate(&sized(size)).is_ok();
            prop_assert_eq!(passed, min <= size && size <= max);
        }

        #[test]
        fn prop_plain_numbers_are_bytes(n in 0u64..1_000_000_000) {
            prop_assert_eq!(parse_human_size(&n.to_string()), n);
        }

        #[test]
        fn prop_kilobytes(n in 0u64..1_000_000) {
            prop_assert_eq!(parse_human_size(&format!("{n}k")), n * 1024);
        }
    }
}
