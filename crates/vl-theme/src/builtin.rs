//! Named built-in themes.

use crate::theme::Theme;
use crate::token::TokenKind;

/// Look up a built-in theme by name (case-insensitive).
///
/// Returns `None` if the name is not recognized.
#[must_use]
pub fn builtin_theme(name: &str) -> Option<Theme> {
    match name.to_ascii_lowercase().as_str() {
        "monokai" => Some(monokai()),
        _ => None,
    }
}

/// List all built-in theme names.
#[must_use]
pub const fn builtin_names() -> &'static [&'static str] {
    &["monokai"]
}

/// The classic Monokai palette.
fn monokai() -> Theme {
    Theme::new("monokai")
        .with(TokenKind::Token, "#f8f8f2")
        .with(TokenKind::Text, "#f8f8f2")
        .with(TokenKind::Error, "#ed007e")
        .with(TokenKind::Comment, "#959077")
        .with(TokenKind::Keyword, "#66d9ef")
        .with(TokenKind::KeywordNamespace, "#ff4689")
        .with(TokenKind::Operator, "#ff4689")
        .with(TokenKind::Punctuation, "#f8f8f2")
        .with(TokenKind::Name, "#f8f8f2")
        .with(TokenKind::NameAttribute, "#a6e22e")
        .with(TokenKind::NameClass, "#a6e22e")
        .with(TokenKind::NameDecorator, "#a6e22e")
        .with(TokenKind::NameFunction, "#a6e22e")
        .with(TokenKind::NameTag, "#ff4689")
        .with(TokenKind::Literal, "#ae81ff")
        .with(TokenKind::Number, "#ae81ff")
        .with(TokenKind::String, "#e6db74")
        .with(TokenKind::StringEscape, "#ae81ff")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
