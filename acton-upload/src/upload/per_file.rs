//! Per-file results of a batch-wide query

/// The answer to a question asked of every file in a batch
///
/// A batch usually holds a single file, so callers can ask it for "the"
/// name without indexing. With several files the answers come back in
/// submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PerFile<T> {
    /// The batch holds no file
    Empty,
    /// The batch holds exactly one file
    Single(T),
    /// The batch holds several files
    Multiple(Vec<T>),
}

impl<T> PerFile<T> {
    /// The answer for a single-file batch
    #[must_use]
    pub fn single(self) -> Option<T> {
        match self {
            Self::Single(value) => Some(value),
            Self::Empty | Self::Multiple(_) => None,
        }
    }

    /// Every answer, in submission order
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Empty => Vec::new(),
            Self::Single(value) => vec![value],
            Self::Multiple(values) => values,
        }
    }

    /// Whether the batch held no file
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Applies `f` to every answer
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, mut f: F) -> PerFile<U> {
        match self {
            Self::Empty => PerFile::Empty,
            Self::Single(value) => PerFile::Single(f(value)),
            Self::Multiple(values) => PerFile::Multiple(values.into_iter().map(f).collect()),
        }
    }
}

impl<T> FromIterator<T> for PerFile<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut values: Vec<T> = iter.into_iter().collect();
        match values.len() {
            0 => Self::Empty,
            1 => values.pop().map_or(Self::Empty, Self::Single),
            _ => Self::Multiple(values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_shapes() {
        assert_eq!(std::iter::empty::<u8>().collect::<PerFile<_>>(), PerFile::Empty);
        assert_eq!([1].into_iter().collect::<PerFile<_>>(), PerFile::Single(1));
        assert_eq!([1, 2].into_iter().collect::<PerFile<_>>(), PerFile::Multiple(vec![1, 2]));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(PerFile::Single("a").single(), Some("a"));
        assert_eq!(PerFile::Multiple(vec!["a", "b"]).single(), None);
        assert_eq!(PerFile::Multiple(vec![1, 2]).into_vec(), [1, 2]);
        assert!(PerFile::<u8>::Empty.into_vec().is_empty());
        assert_eq!(PerFile::Single(2).map(|n| n * 10), PerFile::Single(20));
    }
}
