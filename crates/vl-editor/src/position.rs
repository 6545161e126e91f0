//! Cursor positions.
//!
//! Lines and columns are 0-indexed; columns count chars, matching how
//! `ropey` indexes text. The status bar converts to 1-indexed for display.

use std::fmt;

/// A (line, column) position in the buffer.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub const ZERO: Self = Self { line: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// Offset by a signed delta. The result may be negative, which is why
    /// it comes back as a pair of `isize` for the host to clamp.
    #[must_use]
    pub fn offset(self, dx: isize, dy: isize) -> (isize, isize) {
        (to_signed(self.line) + dy, to_signed(self.col) + dx)
    }
}

fn to_signed(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}
