//! Editing modes.
//!
//! | Mode    | Cursor | Keys                                   |
//! |---------|--------|----------------------------------------|
//! | Normal  | Thin   | `i`, `:`, `h` `j` `k` `l`              |
//! | Insert  | Wide   | everything goes to the text view       |
//! | Command | Thin   | typed into the command line            |

use std::fmt;

use vl_term::ansi::CursorShape;

/// The current editing mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
    Command,
}

impl Mode {
    /// Name for the status bar.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Command => "COMMAND",
        }
    }

    /// The cursor width hint this mode asks the text view for.
    #[must_use]
    pub const fn cursor_width(self) -> CursorWidth {
        match self {
            Self::Insert => CursorWidth::Wide,
            Self::Normal | Self::Command => CursorWidth::Thin,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Visual weight of the text cursor.
///
/// Insert mode gets the wide cursor so the mode is obvious at a glance.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorWidth {
    #[default]
    Thin,
    Wide,
}

impl CursorWidth {
    /// Terminal cursor shape for this width.
    #[must_use]
    pub const fn shape(self) -> CursorShape {
        match self {
            Self::Thin => CursorShape::SteadyBar,
            Self::Wide => CursorShape::SteadyBlock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_normal() {
        assert_eq!(Mode::default(), Mode::Normal);
    }

    #[test]
    fn only_insert_is_wide() {
        assert_eq!(Mode::Insert.cursor_width(), CursorWidth::Wide);
        assert_eq!(Mode::Normal.cursor_width(), CursorWidth::Thin);
        assert_eq!(Mode::Command.cursor_width(), CursorWidth::Thin);
    }

    #[test]
    fn widths_map_to_shapes() {
        assert_eq!(CursorWidth::Thin.shape(), CursorShape::SteadyBar);
        assert_eq!(CursorWidth::Wide.shape(), CursorShape::SteadyBlock);
    }

    #[test]
    fn display_names() {
        assert_eq!(Mode::Command.to_string(), "COMMAND");
    }
}
