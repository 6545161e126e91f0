//! Syntax highlighting: lexer tokens to colored tags.
//!
//! Every pass re-lexes the whole buffer. The steps are
//!
//! 1. resolve the lexer for the language and the `monokai` theme; if either
//!    fails, stop with the host untouched;
//! 2. remove every token tag from the host;
//! 3. walk the tokens with one running char offset, tagging
//!    `[offset, offset + len)` with the token's kind and configuring that
//!    kind's color from the theme, or [`FALLBACK_COLOR`] when the theme has
//!    nothing for it.
//!
//! [`highlight`] is the pure half of the same computation, for callers that
//! only want the spans.

use std::ops::Range;

use vl_term::color::CellColor;
use vl_theme::{Theme, TokenKind, builtin_theme};

use crate::error::HighlightError;
use crate::host::{TagSpan, TextHost};
use crate::lexer::{Lexer, TreeSitterLexer, lexer_for};

/// The theme every pass resolves.
pub const THEME_NAME: &str = "monokai";

/// Foreground for kinds the theme leaves uncolored.
pub const FALLBACK_COLOR: CellColor = vl_theme::theme::FOREGROUND;

/// Summary of one pass, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightReport {
    pub language: &'static str,
    pub tokens: usize,
    pub chars: usize,
}

/// Tag spans for `text` lexed as `language`.
///
/// # Errors
///
/// Whatever resolving the lexer or the theme, or lexing, reports.
pub fn highlight(text: &str, language: &str) -> Result<Vec<TagSpan>, HighlightError> {
    let mut lexer = lexer_for(language)?;
    let tokens = lexer.tokenize(text)?;
    Ok(spans(&tokens).map(|(kind, range)| TagSpan { range, kind }).collect())
}

/// Char ranges for a token stream, laid end to end from zero.
fn spans<'t>(tokens: &'t [(TokenKind, &str)]) -> impl Iterator<Item = (TokenKind, Range<usize>)> + 't {
    tokens.iter().scan(0usize, |offset, &(kind, text)| {
        let start = *offset;
        *offset += text.chars().count();
        Some((kind, start..*offset))
    })
}

fn resolve_theme() -> Result<Theme, HighlightError> {
    builtin_theme(THEME_NAME).ok_or_else(|| HighlightError::UnknownTheme(THEME_NAME.to_string()))
}

// ---------------------------------------------------------------------------
// Highlighter
// ---------------------------------------------------------------------------

/// Applies highlight passes to a host, keeping the last lexer around so
/// repeated passes in one language reuse its parser.
#[derive(Debug, Default)]
pub struct Highlighter {
    lexer: Option<TreeSitterLexer>,
}

impl Highlighter {
    #[must_use]
    pub const fn new() -> Self {
        Self { lexer: None }
    }

    /// Re-tag the whole host for `language`.
    ///
    /// # Errors
    ///
    /// On any resolution or lexing failure, with the host's tags exactly as
    /// they were.
    pub fn refresh(
        &mut self,
        host: &mut impl TextHost,
        language: &str,
    ) -> Result<HighlightReport, HighlightError> {
        let theme = resolve_theme()?;
        let lexer = self.lexer_for(language)?;

        let text = host.text();
        let tokens = lexer.tokenize(&text)?;

        host.remove_tags();
        let mut chars = 0;
        for (kind, range) in spans(&tokens) {
            chars = range.end;
            host.add_tag(kind, range);
            host.configure_tag(kind, theme.color_for(kind).unwrap_or(FALLBACK_COLOR));
        }

        let report = HighlightReport {
            language: lexer.name(),
            tokens: tokens.len(),
            chars,
        };
        tracing::debug!(?report, "highlight pass");
        Ok(report)
    }

    fn lexer_for(&mut self, language: &str) -> Result<&mut TreeSitterLexer, HighlightError> {
        let wanted = crate::lexer::Language::from_name(language)
            .ok_or_else(|| HighlightError::UnknownLanguage(language.to_string()))?;
        let reuse = self.lexer.as_ref().is_some_and(|l| l.language() == wanted);
        if !reuse {
            self.lexer = Some(TreeSitterLexer::new(wanted)?);
        }
        self.lexer
            .as_mut()
            .ok_or_else(|| HighlightError::UnknownLanguage(language.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use crate::host::TextView;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "def f(x):\n    return x + 1  # inc\n";

    fn view(text: &str) -> TextView {
        TextView::with_buffer(Buffer::from_text(text))
    }

    #[test]
    fn spans_tile_the_text() {
        let text = "x = 'é'\n";
        let spans = highlight(text, "python").unwrap();
        assert_eq!(spans.first().map(|s| s.range.start), Some(0));
        assert_eq!(spans.last().map(|s| s.range.end), Some(text.chars().count()));
        for pair in spans.windows(2) {
            assert_eq!(pair[0].range.end, pair[1].range.start);
        }
    }

    #[test]
    fn refresh_tags_whole_text() {
        let mut v = view(SAMPLE);
        let report = Highlighter::new().refresh(&mut v, "python").unwrap();
        assert_eq!(report.language, "python");
        assert_eq!(report.chars, SAMPLE.chars().count());
        assert_eq!(v.tags().spans().len(), report.tokens);
    }

    #[test]
    fn refresh_colors_from_theme() {
        let mut v = view(SAMPLE);
        Highlighter::new().refresh(&mut v, "python").unwrap();
        // "def" is chars 0..3.
        assert_eq!(v.tags().span_at(0).map(|s| s.kind), Some(TokenKind::Keyword));
        assert_eq!(v.tags().color_at(1), CellColor::hex("#66d9ef"));
        let comment = SAMPLE.find("# inc").unwrap();
        assert_eq!(v.tags().color_at(comment), CellColor::hex("#959077"));
    }

    #[test]
    fn refresh_is_idempotent() {
        let mut v = view(SAMPLE);
        let mut hl = Highlighter::new();
        hl.refresh(&mut v, "python").unwrap();
        let first = v.tags().clone();
        hl.refresh(&mut v, "python").unwrap();
        assert_eq!(v.tags(), &first);
    }

    #[test]
    fn refresh_uses_host_text_with_trailing_newline() {
        let mut v = view("x = 1");
        let report = Highlighter::new().refresh(&mut v, "python").unwrap();
        assert_eq!(report.chars, "x = 1\n".len());
    }

    #[test]
    fn unknown_language_leaves_tags_untouched() {
        let mut v = view(SAMPLE);
        let mut hl = Highlighter::new();
        hl.refresh(&mut v, "python").unwrap();
        let before = v.tags().clone();

        let err = hl.refresh(&mut v, "klingon").unwrap_err();
        assert!(matches!(err, HighlightError::UnknownLanguage(_)));
        assert_eq!(v.tags(), &before);
    }

    #[test]
    fn switching_language_swaps_lexer() {
        let mut v = view("fn main() {}\n");
        let mut hl = Highlighter::new();
        assert_eq!(hl.refresh(&mut v, "python").unwrap().language, "python");
        assert_eq!(hl.refresh(&mut v, "RS").unwrap().language, "rust");
        assert_eq!(v.tags().span_at(0).map(|s| s.kind), Some(TokenKind::Keyword));
    }

    #[test]
    fn theme_resolves() {
        assert!(resolve_theme().is_ok());
    }
}
