//! Source positions and spans.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

/// Identifies the source text a span points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SourceId(pub u32);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A position in the source: byte offset plus 1-based line and column.
///
/// Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl Pos {
    pub const START: Pos = Pos {
        offset: 0,
        line: 1,
        column: 1,
    };
}

impl Default for Pos {
    fn default() -> Self {
        Pos::START
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open region of one source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub source: SourceId,
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub fn new(source: SourceId, start: Pos, end: Pos) -> Self {
        Self { source, start, end }
    }

    /// A zero-width span at `pos`.
    pub fn point(source: SourceId, pos: Pos) -> Self {
        Self::new(source, pos, pos)
    }

    /// The smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            source: self.source,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Whether `other` lies entirely within `self`.
    pub fn contains(&self, other: &Span) -> bool {
        self.source == other.source
            && self.start.offset <= other.start.offset
            && other.end.offset <= self.end.offset
    }

    pub fn range(&self) -> Range<usize> {
        self.start.offset..self.end.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset >= self.end.offset
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(offset: usize, column: u32) -> Pos {
        Pos {
            offset,
            line: 1,
            column,
        }
    }

    #[test]
    fn test_cover_and_contains() {
        let a = Span::new(SourceId(0), pos(2, 3), pos(5, 6));
        let b = Span::new(SourceId(0), pos(8, 9), pos(10, 11));
        let both = a.to(b);

        assert_eq!(both.range(), 2..10);
        assert!(both.contains(&a));
        assert!(both.contains(&b));
        assert!(!a.contains(&b));
    }

    #[test]
    fn test_contains_requires_same_source() {
        let a = Span::new(SourceId(0), pos(0, 1), pos(10, 11));
        let b = Span::new(SourceId(1), pos(2, 3), pos(4, 5));
        assert!(!a.contains(&b));
    }
}
