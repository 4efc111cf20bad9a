//! Source locations.

use std::fmt;

use serde::Serialize;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }

    /// Whether `byte` falls inside this span.
    pub fn contains_byte(&self, byte: usize) -> bool {
        self.start_byte <= byte && byte < self.end_byte
    }

    /// Number of bytes covered.
    pub fn len(&self) -> usize {
        self.end_byte - self.start_byte
    }

    pub fn is_empty(&self) -> bool {
        self.start_byte == self.end_byte
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start_byte: usize, end_byte: usize) -> Span {
        Span {
            start_byte,
            end_byte,
            start_line: 3,
            start_col: 5,
            end_line: 3,
            end_col: 5 + (end_byte - start_byte),
        }
    }

    #[test]
    fn test_contains_byte_is_half_open() {
        let s = span(10, 20);
        assert!(s.contains_byte(10));
        assert!(s.contains_byte(19));
        assert!(!s.contains_byte(20));
        assert!(!s.contains_byte(9));
        assert_eq!(s.len(), 10);
        assert!(!s.is_empty());
        assert!(span(4, 4).is_empty());
    }

    #[test]
    fn test_display_uses_start_position() {
        assert_eq!(span(0, 1).to_string(), "3:5");
    }
}
