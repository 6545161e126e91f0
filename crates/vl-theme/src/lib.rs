//! # vl-theme: token kinds and color themes for vimlet
//!
//! ```text
//! lexer ──▶ TokenKind ──▶ Theme::color_for ──▶ CellColor
//!                          (walks parent())      (fallback #d4d4d4)
//! ```
//!
//! Themes are resolved by name through [`builtin_theme`]. Colors are parsed
//! once at construction, so painting never touches hex strings.

pub mod builtin;
pub mod theme;
pub mod token;

pub use builtin::{builtin_names, builtin_theme};
pub use theme::Theme;
pub use token::TokenKind;
