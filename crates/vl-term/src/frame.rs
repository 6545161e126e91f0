// SPDX-License-Identifier: MIT
//
// Frame buffer: the grid the application paints into each frame.
//
// The event loop hands the app a cleared `FrameBuffer`, the app writes
// cells into it, and `FrameBuffer::render` turns the grid into bytes. The
// renderer tracks the last emitted style so runs of identically styled
// cells cost one SGR sequence, not one per cell.
//
// Wide characters (CJK, emoji) occupy two cells: the glyph lives in the
// first, the second is a `Continuation` placeholder that the renderer skips.

use std::io::{self, Write};

use bitflags::bitflags;
use unicode_width::UnicodeWidthChar;

use crate::ansi;
use crate::color::CellColor;

// ─── Attributes ──────────────────────────────────────────────────────────────

bitflags! {
    /// Text attributes for a cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        const BOLD      = 0b0000_0001;
        const ITALIC    = 0b0000_0010;
        const UNDERLINE = 0b0000_0100;
        const INVERSE   = 0b0000_1000;
    }
}

/// Foreground, background and attributes applied to a run of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    pub fg: CellColor,
    pub bg: CellColor,
    pub attr: Attr,
}

impl Style {
    /// A style with only a foreground.
    #[must_use]
    pub const fn fg(fg: CellColor) -> Self {
        Self {
            fg,
            bg: CellColor::Default,
            attr: Attr::empty(),
        }
    }

    /// A style with foreground and background.
    #[must_use]
    pub const fn fg_bg(fg: CellColor, bg: CellColor) -> Self {
        Self {
            fg,
            bg,
            attr: Attr::empty(),
        }
    }

    /// Same colors, extra attributes.
    #[must_use]
    pub const fn with_attr(self, attr: Attr) -> Self {
        Self {
            attr: Attr::from_bits_truncate(self.attr.bits() | attr.bits()),
            ..self
        }
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// Content of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// A printable character.
    Char(char),
    /// Right half of a double-width character.
    Continuation,
}

/// One terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: Glyph,
    pub style: Style,
}

impl Cell {
    /// A blank cell with the given style.
    #[must_use]
    pub const fn blank(style: Style) -> Self {
        Self {
            glyph: Glyph::Char(' '),
            style,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank(Style::default())
    }
}

// ─── FrameBuffer ─────────────────────────────────────────────────────────────

/// A `width × height` grid of cells, row-major.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// Create a frame of blank cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Resize and clear.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells = vec![Cell::default(); usize::from(width) * usize::from(height)];
    }

    /// Reset every cell to a blank default cell.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// The cell at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Overwrite the cell at `(x, y)`. Out-of-bounds writes are dropped.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    /// Paint a whole row with blanks in `style`.
    pub fn fill_row(&mut self, y: u16, style: Style) {
        for x in 0..self.width {
            self.set(x, y, Cell::blank(style));
        }
    }

    /// Write one character at `(x, y)`. Returns the number of columns it
    /// took (0 for zero-width and control characters).
    ///
    /// A wide character that would straddle the right edge is replaced by a
    /// blank so the row never overflows.
    pub fn put_char(&mut self, x: u16, y: u16, ch: char, style: Style) -> u16 {
        let width = ch.width().unwrap_or(0);
        match width {
            0 => 0,
            1 => {
                self.set(x, y, Cell { glyph: Glyph::Char(ch), style });
                1
            }
            _ => {
                if x.saturating_add(1) >= self.width {
                    self.set(x, y, Cell::blank(style));
                    return 1;
                }
                self.set(x, y, Cell { glyph: Glyph::Char(ch), style });
                self.set(x + 1, y, Cell { glyph: Glyph::Continuation, style });
                2
            }
        }
    }

    /// Write a string starting at `(x, y)`, clipped at the right edge.
    /// Returns the column after the last written cell.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            col += self.put_char(col, y, ch, style);
        }
        col
    }

    /// Text of row `y` (continuations skipped). Handy in tests.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| match self.get(x, y)?.glyph {
                Glyph::Char(ch) => Some(ch),
                Glyph::Continuation => None,
            })
            .collect()
    }

    /// Write the whole frame to `w`.
    ///
    /// Each row starts with an absolute cursor move, so a frame never
    /// depends on where the previous one left the cursor.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `w`.
    pub fn render(&self, w: &mut impl Write) -> io::Result<()> {
        ansi::reset(w)?;
        let mut current = Style::default();

        for y in 0..self.height {
            ansi::cursor_to(w, 0, y)?;
            for x in 0..self.width {
                let Some(cell) = self.get(x, y) else { continue };
                let Glyph::Char(ch) = cell.glyph else { continue };

                if cell.style != current {
                    apply_style(w, current, cell.style)?;
                    current = cell.style;
                }
                write!(w, "{ch}")?;
            }
        }

        ansi::reset(w)
    }
}

/// Emit the minimal SGR switch from `from` to `to`.
fn apply_style(w: &mut impl Write, from: Style, to: Style) -> io::Result<()> {
    // Attributes can only be cleared by a full reset.
    let dropped = !from.attr.difference(to.attr).is_empty();
    let from = if dropped {
        ansi::reset(w)?;
        Style::default()
    } else {
        from
    };

    if from.fg != to.fg {
        ansi::fg(w, to.fg)?;
    }
    if from.bg != to.bg {
        ansi::bg(w, to.bg)?;
    }
    let added = to.attr.difference(from.attr);
    ansi::attrs(w, added)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
