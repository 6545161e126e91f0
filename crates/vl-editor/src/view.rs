//! Painting an editor into a frame.
//!
//! The screen is split into three bands:
//!
//! ```text
//! ┌───────────────────────────────────┐
//! │ def f(x):                         │ ← text, tag colors, `~` past the end
//! │     return x                      │
//! │ ~                                 │
//! ├───────────────────────────────────┤
//! │ NORMAL   demo.py | python | 1:1   │ ← status bar
//! ├───────────────────────────────────┤
//! │ Select language: python           │ ← prompt or message
//! └───────────────────────────────────┘
//! ```
//!
//! [`render`] scrolls the text view so the cursor stays visible and
//! returns where the terminal cursor belongs.

use unicode_width::UnicodeWidthChar;

use vl_term::ansi::CursorShape;
use vl_term::frame::{FrameBuffer, Style};
use vl_theme::Theme;

use crate::editor::{Editor, MessageKind};
use crate::host::{TextHost, TextView};

/// Display columns per tab stop.
pub const TAB_WIDTH: usize = 4;

/// Rows below the text: status bar and message line.
const CHROME_ROWS: u16 = 2;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Display column of char `char_col` in a line, with tabs expanded and wide
/// characters counted twice. Stops at a line ending.
#[must_use]
pub fn display_col(chars: impl Iterator<Item = char>, char_col: usize) -> usize {
    let mut col = 0;
    for ch in chars.take(char_col) {
        match ch {
            '\n' | '\r' => break,
            '\t' => col = (col / TAB_WIDTH + 1) * TAB_WIDTH,
            _ => col += ch.width().unwrap_or(0),
        }
    }
    col
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Move the view's scroll offsets so the cursor is inside a
/// `width × height` text area.
pub fn scroll_to_cursor(view: &mut TextView, width: u16, height: u16) {
    let (width, height) = (usize::from(width), usize::from(height));
    if width == 0 || height == 0 {
        return;
    }

    let cursor = view.cursor();
    if cursor.line < view.top {
        view.top = cursor.line;
    } else if cursor.line >= view.top + height {
        view.top = cursor.line + 1 - height;
    }

    let col = view
        .buffer()
        .line(cursor.line)
        .map_or(0, |line| display_col(line.chars(), cursor.col));
    if col < view.left {
        view.left = col;
    } else if col >= view.left + width {
        view.left = col + 1 - width;
    }
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

/// Paint `editor` into `frame`. Returns the terminal cursor position and
/// shape, or `None` when the frame has no room for it.
pub fn render(
    editor: &mut Editor<TextView>,
    theme: &Theme,
    frame: &mut FrameBuffer,
) -> Option<(u16, u16, CursorShape)> {
    let (width, height) = (frame.width(), frame.height());
    if width == 0 || height == 0 {
        return None;
    }

    let text_height = height.saturating_sub(CHROME_ROWS);
    {
        let view = editor.host_mut();
        view.set_page_height(usize::from(text_height));
        scroll_to_cursor(view, width, text_height);
    }

    let mut cursor = paint_text(editor.host(), theme, frame, text_height);

    let status_y = text_height;
    let message_y = text_height + 1;
    if status_y < height {
        paint_status(editor, theme, frame, status_y);
    }
    if message_y < height {
        if let Some(at) = paint_message(editor, theme, frame, message_y) {
            cursor = Some(at);
        }
    }

    let shape = if editor.session().prompt().is_some() {
        CursorShape::SteadyBar
    } else {
        editor.host().cursor_width().shape()
    };
    cursor.map(|(x, y)| (x, y, shape))
}

/// Text rows. Returns the cursor cell if it is on screen.
fn paint_text(
    view: &TextView,
    theme: &Theme,
    frame: &mut FrameBuffer,
    rows: u16,
) -> Option<(u16, u16)> {
    let buffer = view.buffer();
    let tags = view.tags();
    let width = usize::from(frame.width());
    let text_style = theme.text_style();
    let cursor = view.cursor();
    let mut cursor_cell = None;

    for y in 0..rows {
        frame.fill_row(y, text_style);
        let line_idx = view.top + usize::from(y);
        let Some(line) = buffer.line(line_idx) else {
            frame.put_str(0, y, "~", theme.filler_style());
            continue;
        };

        let mut char_idx = buffer.rope().line_to_char(line_idx);
        let mut col = 0usize;
        for ch in line.chars() {
            if ch == '\n' || ch == '\r' {
                break;
            }
            let style = Style {
                fg: tags.color_at(char_idx).unwrap_or(theme.foreground),
                ..text_style
            };
            char_idx += 1;

            if ch == '\t' {
                let next_stop = (col / TAB_WIDTH + 1) * TAB_WIDTH;
                while col < next_stop {
                    put_visible(frame, col, view.left, y, ' ', style);
                    col += 1;
                }
            } else {
                let cols = ch.width().unwrap_or(0);
                if cols > 0 {
                    put_visible(frame, col, view.left, y, ch, style);
                    col += cols;
                }
            }
            if col >= view.left + width {
                break;
            }
        }

        if line_idx == cursor.line {
            let at = display_col(line.chars(), cursor.col);
            if at >= view.left && at - view.left < width {
                cursor_cell = Some((to_u16(at - view.left), y));
            }
        }
    }
    cursor_cell
}

/// Put `ch` at display column `col` if it is inside the window starting at
/// `left`. Columns left of the window are skipped; the frame clips the right.
fn put_visible(frame: &mut FrameBuffer, col: usize, left: usize, y: u16, ch: char, style: Style) {
    if col >= left {
        frame.put_char(to_u16(col - left), y, ch, style);
    }
}

/// Status bar: status text (or the mode) on the left, file, language and
/// position on the right.
fn paint_status(editor: &Editor<TextView>, theme: &Theme, frame: &mut FrameBuffer, y: u16) {
    let style = theme.status_style();
    frame.fill_row(y, style);

    let left = if editor.status().is_empty() {
        editor.mode().display_name()
    } else {
        editor.status()
    };
    let left_end = frame.put_str(1, y, left, style);

    let name = editor
        .path()
        .map_or_else(|| "[No Name]".to_string(), |p| p.display().to_string());
    let modified = if editor.host().is_modified() { " [+]" } else { "" };
    let right = format!(
        "{name}{modified} | {} | {} ",
        editor.language(),
        editor.host().cursor()
    );
    let right_width = right.chars().map(|c| c.width().unwrap_or(0)).sum::<usize>();
    let x = usize::from(frame.width()).saturating_sub(right_width);
    if x > usize::from(left_end) {
        frame.put_str(to_u16(x), y, &right, style);
    }
}

/// Message line: the open prompt, else the current message. Returns the
/// prompt's cursor cell when a prompt is open.
fn paint_message(
    editor: &Editor<TextView>,
    theme: &Theme,
    frame: &mut FrameBuffer,
    y: u16,
) -> Option<(u16, u16)> {
    frame.fill_row(y, theme.text_style());

    if let Some(prompt) = editor.session().prompt() {
        let end = frame.put_str(0, y, prompt.kind.label(), theme.text_style());
        let end = frame.put_str(end, y, &prompt.input, theme.text_style());
        return Some((end.min(frame.width().saturating_sub(1)), y));
    }

    if let Some(message) = editor.message() {
        let style = match message.kind {
            MessageKind::Info => theme.text_style(),
            MessageKind::Error => theme.error_style(),
        };
        frame.put_str(0, y, &message.text, style);
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use pretty_assertions::assert_eq;
    use vl_term::color::CellColor;
    use vl_term::input::{KeyCode, KeyEvent};
    use vl_theme::builtin_theme;

    fn setup(text: &str) -> (Editor<TextView>, Theme) {
        let editor = Editor::new(TextView::with_buffer(Buffer::from_text(text)));
        (editor, builtin_theme("monokai").unwrap())
    }

    fn trimmed(frame: &FrameBuffer, y: u16) -> String {
        frame.row_text(y).trim_end().to_string()
    }

    #[test]
    fn display_col_expands_tabs_and_wide_chars() {
        assert_eq!(display_col("\tx".chars(), 1), 4);
        assert_eq!(display_col("ab\tx".chars(), 3), 4);
        assert_eq!(display_col("日本".chars(), 1), 2);
        assert_eq!(display_col("ab\n".chars(), 9), 2);
    }

    #[test]
    fn paints_text_filler_and_status() {
        let (mut ed, theme) = setup("x = 1\n");
        let mut frame = FrameBuffer::new(40, 5);
        let cursor = render(&mut ed, &theme, &mut frame);

        assert_eq!(trimmed(&frame, 0), "x = 1");
        // The trailing newline starts an empty second line.
        assert_eq!(trimmed(&frame, 1), "");
        assert_eq!(trimmed(&frame, 2), "~");
        let status = frame.row_text(3);
        assert!(status.starts_with(" NORMAL"));
        assert!(status.contains("[No Name] | python | 1:1"));
        assert_eq!(cursor, Some((0, 0, CursorShape::SteadyBar)));
    }

    #[test]
    fn text_takes_tag_colors() {
        let (mut ed, theme) = setup("def f(): pass\n");
        let mut frame = FrameBuffer::new(20, 4);
        render(&mut ed, &theme, &mut frame);
        let fg = |x| frame.get(x, 0).map(|c| c.style.fg);
        assert_eq!(fg(0), CellColor::hex("#66d9ef"));
        assert_eq!(frame.get(0, 0).map(|c| c.style.bg), Some(theme.background));
    }

    #[test]
    fn tabs_are_expanded() {
        let (mut ed, theme) = setup("\tx\n");
        let mut frame = FrameBuffer::new(20, 4);
        render(&mut ed, &theme, &mut frame);
        assert_eq!(trimmed(&frame, 0), "    x");
    }

    #[test]
    fn scrolls_to_keep_cursor_visible() {
        let text: String = (0..10).map(|i| format!("line{i}\n")).collect();
        let (mut ed, theme) = setup(&text);
        for _ in 0..6 {
            ed.handle_key(&KeyEvent::char('j'));
        }
        let mut frame = FrameBuffer::new(20, 5);
        let cursor = render(&mut ed, &theme, &mut frame);

        // Three text rows; line 6 is the last of them.
        assert_eq!(ed.host().top, 4);
        assert_eq!(trimmed(&frame, 2), "line6");
        assert_eq!(cursor.map(|(x, y, _)| (x, y)), Some((0, 2)));
    }

    #[test]
    fn scrolls_horizontally() {
        let (mut ed, theme) = setup("abcdefghijklmnop\n");
        for _ in 0..12 {
            ed.handle_key(&KeyEvent::char('l'));
        }
        let mut frame = FrameBuffer::new(10, 4);
        let cursor = render(&mut ed, &theme, &mut frame);
        assert_eq!(ed.host().left, 3);
        assert_eq!(trimmed(&frame, 0), "defghijklm");
        assert_eq!(cursor.map(|(x, _, _)| x), Some(9));
    }

    #[test]
    fn insert_mode_uses_wide_cursor() {
        let (mut ed, theme) = setup("");
        ed.handle_key(&KeyEvent::char('i'));
        let mut frame = FrameBuffer::new(20, 4);
        let cursor = render(&mut ed, &theme, &mut frame);
        assert_eq!(cursor.map(|(_, _, s)| s), Some(CursorShape::SteadyBlock));
        assert!(frame.row_text(2).starts_with(" INSERT"));
    }

    #[test]
    fn command_mode_shows_command_in_status() {
        let (mut ed, theme) = setup("");
        for ch in ":setlang".chars() {
            ed.handle_key(&KeyEvent::char(ch));
        }
        let mut frame = FrameBuffer::new(40, 4);
        render(&mut ed, &theme, &mut frame);
        assert!(frame.row_text(2).starts_with(" COMMAND MODE: setlang"));
    }

    #[test]
    fn prompt_owns_message_line_and_cursor() {
        let (mut ed, theme) = setup("");
        ed.handle_key(&KeyEvent::ctrl('l'));
        let mut frame = FrameBuffer::new(40, 4);
        let cursor = render(&mut ed, &theme, &mut frame);

        let line = "Select language: python";
        assert_eq!(trimmed(&frame, 3), line);
        assert_eq!(cursor, Some((to_u16(line.len()), 3, CursorShape::SteadyBar)));
    }

    #[test]
    fn errors_use_error_style() {
        let (mut ed, theme) = setup("");
        for ch in ":bogus".chars() {
            ed.handle_key(&KeyEvent::char(ch));
        }
        ed.handle_key(&KeyEvent::new(KeyCode::Enter));
        let mut frame = FrameBuffer::new(40, 4);
        render(&mut ed, &theme, &mut frame);
        assert_eq!(trimmed(&frame, 3), "Unknown command: bogus");
        assert_eq!(frame.get(0, 3).map(|c| c.style), Some(theme.error_style()));
    }

    #[test]
    fn tiny_frames_do_not_panic() {
        let (mut ed, theme) = setup("abc\n");
        assert_eq!(render(&mut ed, &theme, &mut FrameBuffer::new(0, 0)), None);
        let mut one = FrameBuffer::new(5, 1);
        render(&mut ed, &theme, &mut one);
        assert!(one.row_text(0).starts_with(" NORM"));
    }
}
