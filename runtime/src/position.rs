//! Byte-offset positions into a lexer's input buffer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Half-open byte interval `[start, end)` over the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextPosition {
    pub start: usize,
    pub end: usize,
}

impl TextPosition {
    /// The empty position at the start of input.
    pub const BEGIN: TextPosition = TextPosition { start: 0, end: 0 };

    /// Create a position spanning `[start, end)`.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "position start {} is past its end {}", start, end);
        TextPosition { start, end }
    }

    /// An empty position at `offset`.
    pub fn at(offset: usize) -> Self {
        TextPosition { start: offset, end: offset }
    }

    /// The smallest position covering both `self` and `other`.
    pub fn to(&self, other: TextPosition) -> TextPosition {
        TextPosition {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Collapse to the empty position at this position's end.
    pub fn at_end(&self) -> TextPosition {
        TextPosition::at(self.end)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl Default for TextPosition {
    fn default() -> Self {
        TextPosition::BEGIN
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Anything that occupies a span of the input.
pub trait Positioned {
    fn position(&self) -> TextPosition;
}

impl Positioned for TextPosition {
    fn position(&self) -> TextPosition {
        *self
    }
}
