//! Source location tracking for error reporting.
//!
//! Provides [`Span`] to record where an AST node starts in the query text.

use std::fmt;

/// A span of query source, represented by its starting position.
///
/// The compiler copies the line of every dispatched node into the
/// instruction queue so the VM can report where a runtime error came from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed, 0 for synthesized nodes).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// Whether this span is empty (zero length).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether this span was synthesized rather than read from source.
    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.line == 0
    }

    /// Extend this span so it also covers `other`.
    ///
    /// Spans on different lines keep the first position and sum the lengths.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        if self.line != other.line {
            return Span {
                line: self.line,
                col: self.col,
                len: self.len + other.len,
            };
        }
        let start = self.col.min(other.col);
        let end = (self.col + self.len).max(other.col + other.len);
        Span {
            line: self.line,
            col: start,
            len: end - start,
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_span_is_synthetic() {
        let span = Span::default();
        assert!(span.is_synthetic());
        assert!(span.is_empty());
        assert!(!Span::point(2, 1).is_synthetic());
    }

    #[test]
    fn span_display() {
        assert_eq!(Span::new(4, 12, 3).to_string(), "4:12");
    }

    #[test]
    fn merge_on_one_line_covers_both() {
        let merged = Span::new(1, 10, 3).merge(Span::new(1, 2, 4));
        assert_eq!(merged, Span::new(1, 2, 11));
    }

    #[test]
    fn merge_across_lines_keeps_start() {
        let merged = Span::new(1, 5, 2).merge(Span::new(2, 1, 7));
        assert_eq!(merged, Span::new(1, 5, 9));
    }
}
