use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` within a single source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextRange {
    pub start: u32,
    pub end: u32,
}

impl TextRange {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "range start must not exceed end");
        Self { start, end }
    }

    /// Zero-width range at `offset`.
    pub fn empty(offset: u32) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check whether the range contains a byte offset.
    pub fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }

    /// True when the two ranges share at least one byte.
    pub fn intersects(&self, other: &TextRange) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    /// Smallest range covering both.
    pub fn cover(&self, other: &TextRange) -> TextRange {
        TextRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn as_usize_range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Byte range within a named source file used for diagnostics and tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub file: PathBuf,
    pub start: u32,
    pub end: u32,
}

impl SourceSpan {
    /// Construct a new span from a path and byte offsets.
    pub fn new(file: impl AsRef<Path>, start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");

        Self {
            file: file.as_ref().to_path_buf(),
            start,
            end,
        }
    }

    pub fn from_range(file: impl AsRef<Path>, range: TextRange) -> Self {
        Self::new(file, range.start, range.end)
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Returns true when the span has zero width.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.start, self.end)
    }

    /// Convert the start offset to a 1-indexed `(line, column)` pair.
    ///
    /// Columns count bytes, matching the convention of compiler diagnostics.
    pub fn to_line_col(&self, source: &str) -> (usize, usize) {
        let mut line = 1usize;
        let mut col = 1usize;

        for (idx, byte) in source.bytes().enumerate() {
            if idx >= self.start as usize {
                break;
            }

            if byte == b'\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }

        (line, col)
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.file.display(), self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_counts_newlines() {
        let source = "struct A {\n  ~A();\n};\n";
        let span = SourceSpan::new("a.hpp", 13, 15);
        assert_eq!(span.to_line_col(source), (2, 3));
    }

    #[test]
    fn line_col_at_start_of_file() {
        let span = SourceSpan::new("a.hpp", 0, 1);
        assert_eq!(span.to_line_col("x"), (1, 1));
    }

    #[test]
    fn ranges_intersect_only_when_overlapping() {
        let a = TextRange::new(0, 5);
        assert!(a.intersects(&TextRange::new(4, 9)));
        assert!(!a.intersects(&TextRange::new(5, 9)));
        assert!(!a.intersects(&TextRange::empty(3)));
    }

    #[test]
    fn cover_spans_both_ranges() {
        let covered = TextRange::new(3, 5).cover(&TextRange::new(10, 12));
        assert_eq!(covered, TextRange::new(3, 12));
        assert_eq!(covered.len(), 9);
    }
}
