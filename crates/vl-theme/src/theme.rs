//! Themes: token colors plus the few UI colors the view needs.
//!
//! A theme colors a sparse set of token kinds. [`Theme::color_for`] walks
//! the kind's lineage, so `KeywordType` picks up `Keyword`'s color unless the
//! theme names it explicitly. A kind with no colored ancestor resolves to
//! `None`, and the highlighter substitutes [`Theme::foreground`].

use std::collections::HashMap;

use vl_term::color::CellColor;
use vl_term::frame::{Attr, Style};

use crate::token::TokenKind;

/// Editor background.
pub const BACKGROUND: CellColor = CellColor::Rgb(0x1e, 0x1e, 0x1e);

/// Foreground for text the theme does not color.
pub const FOREGROUND: CellColor = CellColor::Rgb(0xd4, 0xd4, 0xd4);

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// A named set of token colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    /// Editor and status line background.
    pub background: CellColor,
    /// Fallback foreground.
    pub foreground: CellColor,
    /// Error messages on the message line.
    pub error: CellColor,
    tokens: HashMap<TokenKind, CellColor>,
}

impl Theme {
    /// An empty theme: every token falls back to the foreground.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            background: BACKGROUND,
            foreground: FOREGROUND,
            error: CellColor::Rgb(0xf4, 0x47, 0x47),
            tokens: HashMap::new(),
        }
    }

    /// Builder: color `kind` with a hex string. Bad hex is ignored.
    #[must_use]
    pub fn with(mut self, kind: TokenKind, hex: &str) -> Self {
        if let Some(color) = CellColor::hex(hex) {
            self.tokens.insert(kind, color);
        }
        self
    }

    /// The color explicitly assigned to `kind`, without inheritance.
    #[must_use]
    pub fn own_color(&self, kind: TokenKind) -> Option<CellColor> {
        self.tokens.get(&kind).copied()
    }

    /// The color for `kind`, inherited from the nearest colored ancestor.
    #[must_use]
    pub fn color_for(&self, kind: TokenKind) -> Option<CellColor> {
        kind.lineage().find_map(|k| self.own_color(k))
    }

    /// [`color_for`](Self::color_for) with the foreground as fallback.
    #[must_use]
    pub fn resolve(&self, kind: TokenKind) -> CellColor {
        self.color_for(kind).unwrap_or(self.foreground)
    }

    /// Plain text on the editor background.
    #[must_use]
    pub const fn text_style(&self) -> Style {
        Style::fg_bg(self.foreground, self.background)
    }

    /// The status bar: the editor colors inverted.
    #[must_use]
    pub const fn status_style(&self) -> Style {
        Style::fg_bg(self.background, self.foreground).with_attr(Attr::BOLD)
    }

    /// Error text on the message line.
    #[must_use]
    pub const fn error_style(&self) -> Style {
        Style::fg_bg(self.error, self.background)
    }

    /// `~` markers past the end of the buffer.
    #[must_use]
    pub fn filler_style(&self) -> Style {
        Style::fg_bg(self.resolve(TokenKind::Comment), self.background)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
