//! The text view the editor drives.
//!
//! [`TextHost`] is the surface the editor and the highlighter are allowed to
//! touch: whole-text get/set, the cursor, a cursor width hint, built-in key
//! editing, and a tag table that colors char ranges. [`TextView`] is the
//! terminal implementation, backed by a [`Buffer`].
//!
//! Tags are keyed by [`TokenKind`]. A span says "chars `a..b` are a
//! `Keyword`", and a separate table says what color `Keyword` is, so a
//! highlight pass can recolor a kind without touching its spans.

use std::collections::HashMap;
use std::ops::Range;

use vl_term::color::CellColor;
use vl_term::input::{KeyCode, KeyEvent, Modifiers};
use vl_theme::TokenKind;

use crate::buffer::Buffer;
use crate::mode::CursorWidth;
use crate::position::Position;

// ---------------------------------------------------------------------------
// TextHost
// ---------------------------------------------------------------------------

/// What the editor needs from a text widget.
pub trait TextHost {
    /// The full text. Always ends with a newline.
    fn text(&self) -> String;

    /// Replace the full text. Tags are left for the next highlight pass.
    fn set_text(&mut self, text: &str);

    /// Whether the text changed since it was loaded or last saved.
    fn is_modified(&self) -> bool;

    /// Record that the current text matches the file on disk.
    fn mark_saved(&mut self);

    /// Insert at the cursor and move the cursor past it.
    fn insert_text(&mut self, text: &str);

    fn cursor(&self) -> Position;

    /// Move the cursor. Out-of-range targets are clamped, never rejected.
    fn set_cursor(&mut self, line: isize, col: isize);

    fn set_cursor_width(&mut self, width: CursorWidth);

    /// Built-in handling for a key the editor does not interpret. Returns
    /// `true` if the text changed.
    fn default_key(&mut self, key: &KeyEvent) -> bool;

    /// Drop every token span. Configured colors survive.
    fn remove_tags(&mut self);

    /// Tag chars `range` as `kind`.
    fn add_tag(&mut self, kind: TokenKind, range: Range<usize>);

    /// Set the foreground for every span of `kind`.
    fn configure_tag(&mut self, kind: TokenKind, color: CellColor);
}

// ---------------------------------------------------------------------------
// TagTable
// ---------------------------------------------------------------------------

/// One tagged char range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpan {
    pub range: Range<usize>,
    pub kind: TokenKind,
}

/// Spans sorted by start, plus a color per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTable {
    spans: Vec<TagSpan>,
    colors: HashMap<TokenKind, CellColor>,
}

impl TagTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_spans(&mut self) {
        self.spans.clear();
    }

    /// Add a span. Empty ranges are dropped.
    pub fn add(&mut self, kind: TokenKind, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let at = self.spans.partition_point(|s| s.range.start <= range.start);
        self.spans.insert(at, TagSpan { range, kind });
    }

    pub fn configure(&mut self, kind: TokenKind, color: CellColor) {
        self.colors.insert(kind, color);
    }

    #[inline]
    #[must_use]
    pub fn spans(&self) -> &[TagSpan] {
        &self.spans
    }

    #[must_use]
    pub fn color(&self, kind: TokenKind) -> Option<CellColor> {
        self.colors.get(&kind).copied()
    }

    /// The span covering char `idx`. With overlaps, the one starting last
    /// wins.
    #[must_use]
    pub fn span_at(&self, idx: usize) -> Option<&TagSpan> {
        let end = self.spans.partition_point(|s| s.range.start <= idx);
        self.spans[..end].iter().rev().find(|s| s.range.contains(&idx))
    }

    /// Foreground for char `idx`, if it is tagged with a configured kind.
    #[must_use]
    pub fn color_at(&self, idx: usize) -> Option<CellColor> {
        self.span_at(idx).and_then(|s| self.color(s.kind))
    }
}

// ---------------------------------------------------------------------------
// TextView
// ---------------------------------------------------------------------------

/// Lines moved by PageUp/PageDown until the view reports its height.
const DEFAULT_PAGE: usize = 20;

/// A terminal text view: buffer, cursor, tags and scroll offsets.
#[derive(Debug, Clone)]
pub struct TextView {
    buffer: Buffer,
    cursor: Position,
    cursor_width: CursorWidth,
    tags: TagTable,
    /// First visible line.
    pub top: usize,
    /// First visible display column.
    pub left: usize,
    page: usize,
}

impl Default for TextView {
    fn default() -> Self {
        Self::new()
    }
}

impl TextView {
    #[must_use]
    pub fn new() -> Self {
        Self::with_buffer(Buffer::new())
    }

    #[must_use]
    pub fn with_buffer(buffer: Buffer) -> Self {
        Self {
            buffer,
            cursor: Position::ZERO,
            cursor_width: CursorWidth::Thin,
            tags: TagTable::new(),
            top: 0,
            left: 0,
            page: DEFAULT_PAGE,
        }
    }

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub const fn tags(&self) -> &TagTable {
        &self.tags
    }

    #[inline]
    #[must_use]
    pub const fn cursor_width(&self) -> CursorWidth {
        self.cursor_width
    }

    /// Rows of text on screen, used for paging.
    pub fn set_page_height(&mut self, rows: usize) {
        self.page = rows.max(1);
    }

    fn cursor_idx(&self) -> usize {
        self.buffer
            .pos_to_char_idx(self.cursor)
            .unwrap_or_else(|| self.buffer.len_chars())
    }

    fn move_to_idx(&mut self, idx: usize) {
        if let Some(pos) = self.buffer.char_idx_to_pos(idx.min(self.buffer.len_chars())) {
            self.cursor = self.buffer.clamp(signed(pos.line), signed(pos.col));
        }
    }

    fn move_lines(&mut self, delta: isize) {
        let (line, col) = self.cursor.offset(0, delta);
        self.set_cursor(line, col);
    }
}

fn signed(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

impl TextHost for TextView {
    fn text(&self) -> String {
        self.buffer.text()
    }

    fn set_text(&mut self, text: &str) {
        self.buffer.set_text(text);
        self.cursor = self.buffer.clamp(signed(self.cursor.line), signed(self.cursor.col));
    }

    fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    fn mark_saved(&mut self) {
        self.buffer.mark_saved();
    }

    fn insert_text(&mut self, text: &str) {
        let idx = self.cursor_idx();
        self.buffer.insert(idx, text);
        self.move_to_idx(idx + text.chars().count());
    }

    fn cursor(&self) -> Position {
        self.cursor
    }

    fn set_cursor(&mut self, line: isize, col: isize) {
        self.cursor = self.buffer.clamp(line, col);
    }

    fn set_cursor_width(&mut self, width: CursorWidth) {
        self.cursor_width = width;
    }

    fn default_key(&mut self, key: &KeyEvent) -> bool {
        if let Some(ch) = key.printable() {
            self.insert_text(ch.encode_utf8(&mut [0; 4]));
            return true;
        }
        if key.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) {
            return false;
        }

        let idx = self.cursor_idx();
        match key.code {
            KeyCode::Enter => self.insert_text("\n"),
            KeyCode::Tab => self.insert_text("\t"),
            KeyCode::Backspace => {
                if idx == 0 || !self.buffer.remove(idx - 1..idx) {
                    return false;
                }
                self.move_to_idx(idx - 1);
            }
            KeyCode::Delete => return self.buffer.remove(idx..idx + 1),
            KeyCode::Left => {
                self.move_to_idx(idx.saturating_sub(1));
                return false;
            }
            KeyCode::Right => {
                self.move_to_idx(idx + 1);
                return false;
            }
            KeyCode::Up => {
                self.move_lines(-1);
                return false;
            }
            KeyCode::Down => {
                self.move_lines(1);
                return false;
            }
            KeyCode::PageUp => {
                self.move_lines(-signed(self.page));
                return false;
            }
            KeyCode::PageDown => {
                self.move_lines(signed(self.page));
                return false;
            }
            KeyCode::Home => {
                self.cursor.col = 0;
                return false;
            }
            KeyCode::End => {
                self.set_cursor(signed(self.cursor.line), isize::MAX);
                return false;
            }
            _ => return false,
        }
        true
    }

    fn remove_tags(&mut self) {
        self.tags.clear_spans();
    }

    fn add_tag(&mut self, kind: TokenKind, range: Range<usize>) {
        self.tags.add(kind, range);
    }

    fn configure_tag(&mut self, kind: TokenKind, color: CellColor) {
        self.tags.configure(kind, color);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn view(text: &str) -> TextView {
        TextView::with_buffer(Buffer::from_text(text))
    }

    fn press(view: &mut TextView, code: KeyCode) -> bool {
        view.default_key(&KeyEvent::new(code))
    }

    #[test]
    fn text_always_ends_with_newline() {
        assert_eq!(view("").text(), "\n");
        assert_eq!(view("x").text(), "x\n");
    }

    #[test]
    fn set_cursor_clamps() {
        let mut v = view("abc\nd\n");
        v.set_cursor(-1, -1);
        assert_eq!(v.cursor(), Position::ZERO);
        v.set_cursor(0, 50);
        assert_eq!(v.cursor(), Position::new(0, 3));
        v.set_cursor(1, 2);
        assert_eq!(v.cursor(), Position::new(1, 1));
        v.set_cursor(40, 0);
        assert_eq!(v.cursor(), Position::new(2, 0));
    }

    #[test]
    fn typing_inserts_at_cursor() {
        let mut v = view("ac");
        v.set_cursor(0, 1);
        assert!(v.default_key(&KeyEvent::char('b')));
        assert_eq!(v.buffer().contents(), "abc");
        assert_eq!(v.cursor(), Position::new(0, 2));
    }

    #[test]
    fn enter_splits_line() {
        let mut v = view("ab");
        v.set_cursor(0, 1);
        assert!(press(&mut v, KeyCode::Enter));
        assert_eq!(v.buffer().contents(), "a\nb");
        assert_eq!(v.cursor(), Position::new(1, 0));
    }

    #[test]
    fn backspace_joins_lines() {
        let mut v = view("a\nb");
        v.set_cursor(1, 0);
        assert!(press(&mut v, KeyCode::Backspace));
        assert_eq!(v.buffer().contents(), "ab");
        assert_eq!(v.cursor(), Position::new(0, 1));
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let mut v = view("a");
        assert!(!press(&mut v, KeyCode::Backspace));
        assert_eq!(v.buffer().contents(), "a");
    }

    #[test]
    fn delete_at_end_is_noop() {
        let mut v = view("ab");
        v.set_cursor(0, 2);
        assert!(!press(&mut v, KeyCode::Delete));
        v.set_cursor(0, 0);
        assert!(press(&mut v, KeyCode::Delete));
        assert_eq!(v.buffer().contents(), "b");
    }

    #[test]
    fn arrows_move_without_modifying() {
        let mut v = view("ab\ncd");
        assert!(!press(&mut v, KeyCode::Right));
        assert!(!press(&mut v, KeyCode::Down));
        assert_eq!(v.cursor(), Position::new(1, 1));
        assert!(!press(&mut v, KeyCode::End));
        assert_eq!(v.cursor(), Position::new(1, 2));
        assert!(!press(&mut v, KeyCode::Home));
        assert!(!press(&mut v, KeyCode::Left));
        assert_eq!(v.cursor(), Position::new(0, 2));
        assert!(!v.buffer().is_modified());
    }

    #[test]
    fn ctrl_keys_are_not_typed() {
        let mut v = view("");
        assert!(!v.default_key(&KeyEvent::ctrl('x')));
        assert!(v.buffer().is_empty());
    }

    #[test]
    fn paste_moves_cursor_past_text() {
        let mut v = view("[]");
        v.set_cursor(0, 1);
        v.insert_text("x\ny");
        assert_eq!(v.buffer().contents(), "[x\ny]");
        assert_eq!(v.cursor(), Position::new(1, 1));
    }

    #[test]
    fn tags_look_up_by_char() {
        let mut t = TagTable::new();
        t.add(TokenKind::Name, 4..6);
        t.add(TokenKind::Keyword, 0..3);
        t.add(TokenKind::Text, 7..7);
        t.configure(TokenKind::Keyword, CellColor::Rgb(1, 2, 3));
        assert_eq!(t.spans().len(), 2);
        assert_eq!(t.spans()[0].kind, TokenKind::Keyword);
        assert_eq!(t.color_at(2), Some(CellColor::Rgb(1, 2, 3)));
        assert_eq!(t.color_at(3), None);
        assert_eq!(t.span_at(5).map(|s| s.kind), Some(TokenKind::Name));
        assert_eq!(t.color_at(5), None);
    }

    #[test]
    fn remove_tags_keeps_colors() {
        let mut v = view("x");
        v.add_tag(TokenKind::Name, 0..1);
        v.configure_tag(TokenKind::Name, CellColor::Rgb(9, 9, 9));
        v.remove_tags();
        assert!(v.tags().spans().is_empty());
        assert_eq!(v.tags().color(TokenKind::Name), Some(CellColor::Rgb(9, 9, 9)));
    }
}
