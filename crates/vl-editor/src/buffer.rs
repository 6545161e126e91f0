//! Text storage.
//!
//! A [`Buffer`] wraps a [`ropey::Rope`] with the handful of operations the
//! text view needs: whole-text replace, char-indexed insert and remove, and
//! conversion between char indices and `(line, col)` positions. Columns are
//! char offsets, never bytes.
//!
//! The buffer also carries a modified flag. It does no I/O itself; the
//! editor owns the file path and [`crate::io`] does the reading and writing.

use std::ops::Range;

use ropey::{Rope, RopeSlice};

use crate::position::Position;

/// A rope-backed text buffer.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    rope: Rope,
    modified: bool,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            ..Self::default()
        }
    }

    // -- Text access --------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    /// The buffer exactly as stored.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    /// The buffer as saved: always ends with a newline, adding one only if
    /// the stored text lacks it.
    #[must_use]
    pub fn text(&self) -> String {
        let mut text = self.contents();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        text
    }

    /// Number of lines. An empty buffer has one; a trailing newline starts
    /// one more.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Line `line` including its line ending.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<RopeSlice<'_>> {
        (line < self.rope.len_lines()).then(|| self.rope.line(line))
    }

    /// Chars in line `line` excluding `\n`, `\r\n` or `\r`.
    #[must_use]
    pub fn line_content_len(&self, line: usize) -> Option<usize> {
        self.line(line).map(|slice| {
            let total = slice.len_chars();
            let before = total.checked_sub(2).map(|i| slice.char(i));
            let last = total.checked_sub(1).map(|i| slice.char(i));
            match (before, last) {
                (Some('\r'), Some('\n')) => total - 2,
                (_, Some('\n' | '\r')) => total - 1,
                _ => total,
            }
        })
    }

    // -- Coordinates --------------------------------------------------------

    /// Clamp `(line, col)` into the buffer: line into `[0, last]`, col into
    /// `[0, content_len]`. Negative inputs clamp to zero.
    #[must_use]
    pub fn clamp(&self, line: isize, col: isize) -> Position {
        let last = self.line_count().saturating_sub(1);
        let line = usize::try_from(line).unwrap_or(0).min(last);
        let max_col = self.line_content_len(line).unwrap_or(0);
        let col = usize::try_from(col).unwrap_or(0).min(max_col);
        Position::new(line, col)
    }

    /// Absolute char index of a position, or `None` if it is outside the
    /// buffer. `col` may equal the line's full length.
    #[must_use]
    pub fn pos_to_char_idx(&self, pos: Position) -> Option<usize> {
        let line = self.line(pos.line)?;
        (pos.col <= line.len_chars()).then(|| self.rope.line_to_char(pos.line) + pos.col)
    }

    /// Position of an absolute char index. `len_chars()` itself is valid.
    #[must_use]
    pub fn char_idx_to_pos(&self, idx: usize) -> Option<Position> {
        if idx > self.rope.len_chars() {
            return None;
        }
        let line = self.rope.char_to_line(idx);
        Some(Position::new(line, idx - self.rope.line_to_char(line)))
    }

    // -- Editing ------------------------------------------------------------

    /// Replace everything. Leaves the modified flag alone; callers that load
    /// from disk mark the buffer saved afterwards.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    /// Insert at a char index, clamped to the end.
    pub fn insert(&mut self, idx: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let idx = idx.min(self.rope.len_chars());
        self.rope.insert(idx, text);
        self.modified = true;
    }

    /// Remove a char range, clamped to the buffer. Returns `false` if
    /// nothing was removed.
    pub fn remove(&mut self, range: Range<usize>) -> bool {
        let len = self.rope.len_chars();
        let (start, end) = (range.start.min(len), range.end.min(len));
        if start >= end {
            return false;
        }
        self.rope.remove(start..end);
        self.modified = true;
        true
    }

    // -- Metadata -----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    #[inline]
    pub const fn mark_saved(&mut self) {
        self.modified = false;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_buffer_has_one_line() {
        let buf = Buffer::new();
        assert_eq!(buf.line_count(), 1);
        assert!(buf.is_empty());
        assert_eq!(buf.text(), "\n");
    }

    #[test]
    fn text_adds_newline_only_when_missing() {
        assert_eq!(Buffer::from_text("a\nb").text(), "a\nb\n");
        assert_eq!(Buffer::from_text("a\nb\n").text(), "a\nb\n");
    }

    #[test]
    fn content_len_ignores_line_endings() {
        let buf = Buffer::from_text("ab\r\ncafé\nx\ry");
        assert_eq!(buf.line_content_len(0), Some(2));
        assert_eq!(buf.line_content_len(1), Some(4));
        assert_eq!(buf.line_content_len(2), Some(1));
        assert_eq!(buf.line_content_len(3), Some(1));
        assert_eq!(buf.line_content_len(9), None);
    }

    #[test]
    fn clamp_bounds_line_and_col() {
        let buf = Buffer::from_text("hello\nhi\n");
        assert_eq!(buf.clamp(-3, -1), Position::ZERO);
        assert_eq!(buf.clamp(0, 99), Position::new(0, 5));
        assert_eq!(buf.clamp(1, 4), Position::new(1, 2));
        assert_eq!(buf.clamp(50, 3), Position::new(2, 0));
    }

    #[test]
    fn position_round_trip() {
        let buf = Buffer::from_text("ab\ncd\n");
        let idx = buf.pos_to_char_idx(Position::new(1, 1)).unwrap();
        assert_eq!(idx, 4);
        assert_eq!(buf.char_idx_to_pos(idx), Some(Position::new(1, 1)));
        assert_eq!(buf.pos_to_char_idx(Position::new(0, 4)), None);
        assert_eq!(buf.char_idx_to_pos(99), None);
    }

    #[test]
    fn edits_mark_modified() {
        let mut buf = Buffer::from_text("ac");
        assert!(!buf.is_modified());
        buf.insert(1, "b");
        assert_eq!(buf.contents(), "abc");
        assert!(buf.is_modified());
        buf.mark_saved();
        assert!(buf.remove(0..1));
        assert_eq!(buf.contents(), "bc");
        assert!(buf.is_modified());
    }

    #[test]
    fn out_of_range_edits_clamp() {
        let mut buf = Buffer::from_text("ab");
        buf.insert(10, "!");
        assert_eq!(buf.contents(), "ab!");
        assert!(!buf.remove(5..9));
        assert!(buf.remove(2..9));
        assert_eq!(buf.contents(), "ab");
    }

    #[test]
    fn set_text_keeps_flag() {
        let mut buf = Buffer::from_text("x");
        buf.set_text("y\nz");
        assert_eq!(buf.line_count(), 2);
        assert!(!buf.is_modified());
    }
}
