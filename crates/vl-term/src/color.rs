// SPDX-License-Identifier: MIT
//
// Terminal colors.
//
// vimlet paints with 24-bit TrueColor only. Themes are written as hex
// strings (`#66d9ef`), parsed once when the theme is built, and stored as
// `CellColor` so the paint path never touches strings.

use std::fmt;

// ─── CellColor ──────────────────────────────────────────────────────────────

/// A color as stored in a frame cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellColor {
    /// The terminal's own default foreground/background.
    #[default]
    Default,
    /// 24-bit color.
    Rgb(u8, u8, u8),
}

impl CellColor {
    /// Parse `#rrggbb`, `rrggbb`, `#rgb` or `rgb`.
    ///
    /// Returns `None` for anything else.
    #[must_use]
    pub fn hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        match digits.len() {
            6 => {
                let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
                let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
                let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
                Some(Self::Rgb(r, g, b))
            }
            3 => {
                // Each nibble is doubled: `#f80` → `#ff8800`.
                let mut out = [0u8; 3];
                for (slot, ch) in out.iter_mut().zip(digits.chars()) {
                    let v = u8::try_from(ch.to_digit(16)?).ok()?;
                    *slot = v << 4 | v;
                }
                Some(Self::Rgb(out[0], out[1], out[2]))
            }
            _ => None,
        }
    }

    /// True for [`CellColor::Default`].
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
