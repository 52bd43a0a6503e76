//! Source locations.
//!
//! [`Span`] is a half-open byte range into the source text. [`LineIndex`]
//! maps byte offsets back to 1-based line and column numbers.

use std::{fmt, ops::Range};

/// A half-open byte range `start..end` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create a new span from a byte range.
    pub fn new(range: Range<usize>) -> Self {
        debug_assert!(range.start <= range.end, "inverted span {range:?}");
        Self {
            start: range.start,
            end: range.end,
        }
    }

    /// Create a zero-width span at `offset`.
    pub fn empty(offset: usize) -> Self {
        Self::new(offset..offset)
    }

    /// Get the start offset of the span
    pub fn start(&self) -> usize {
        self.start
    }

    /// Get the end offset of the span
    pub fn end(&self) -> usize {
        self.end
    }

    /// Get the length of the span
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Create a union of two spans (encompassing both)
    pub fn union(&self, other: Span) -> Span {
        Self::new(self.start.min(other.start)..self.end.max(other.end))
    }

    /// The span as a `Range`, suitable for slicing the source.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Byte offsets of line starts, for offset → (line, column) lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    offsets: Vec<usize>,
}

impl LineIndex {
    /// Build the index for `source`.
    pub fn new(source: &str) -> Self {
        let mut offsets = vec![0];
        offsets.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { offsets }
    }

    /// Number of lines (a trailing newline opens an empty last line).
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    fn line_index(&self, offset: usize) -> usize {
        self.offsets
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    /// 1-based line number containing `offset`.
    pub fn line(&self, offset: usize) -> usize {
        self.line_index(offset) + 1
    }

    /// 1-based byte column of `offset` within its line.
    pub fn column(&self, offset: usize) -> usize {
        offset - self.offsets[self.line_index(offset)] + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_basic_functionality() {
        let span = Span::new(5..10);
        assert_eq!(span.start(), 5);
        assert_eq!(span.end(), 10);
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
    }

    #[test]
    fn test_span_empty() {
        let span = Span::empty(5);
        assert_eq!(span.len(), 0);
        assert!(span.is_empty());
    }

    #[test]
    fn test_span_union() {
        let union = Span::new(5..10).union(Span::new(15..20));
        assert_eq!(union.start(), 5);
        assert_eq!(union.end(), 20);
    }

    #[test]
    fn test_line_index_single_line() {
        let index = LineIndex::new("hello");
        assert_eq!(index.len(), 1);
        assert_eq!(index.line(0), 1);
        assert_eq!(index.column(3), 4);
    }

    #[test]
    fn test_line_index_multi_line() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.len(), 4);
        assert_eq!((index.line(0), index.column(0)), (1, 1));
        assert_eq!((index.line(2), index.column(2)), (1, 3));
        assert_eq!((index.line(3), index.column(3)), (2, 1));
        assert_eq!((index.line(6), index.column(6)), (3, 1));
        assert_eq!((index.line(8), index.column(8)), (4, 2));
    }

    #[test]
    fn test_line_index_offset_at_end() {
        let source = "a\nb";
        let index = LineIndex::new(source);
        assert_eq!(index.line(source.len()), 2);
        assert_eq!(index.column(source.len()), 2);
    }
}
