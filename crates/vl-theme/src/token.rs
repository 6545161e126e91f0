//! Token kinds: the hierarchical categories a lexer assigns to text.
//!
//! Kinds form a tree rooted at [`TokenKind::Token`], in the dotted naming
//! scheme most highlighters share (`Token.Literal.String.Escape`). A theme
//! only has to color a few interior nodes; lookups walk up through
//! [`TokenKind::parent`] until something matches.

use std::fmt;

// ---------------------------------------------------------------------------
// TokenKind
// ---------------------------------------------------------------------------

/// A token category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    Token,

    Text,
    Whitespace,
    Error,

    Keyword,
    KeywordConstant,
    KeywordDeclaration,
    KeywordNamespace,
    KeywordType,

    Name,
    NameAttribute,
    NameBuiltin,
    NameClass,
    NameDecorator,
    NameFunction,
    NameTag,

    Literal,
    String,
    StringEscape,
    Number,

    Operator,
    Punctuation,

    Comment,
    CommentPreproc,
}

impl TokenKind {
    /// Every kind, root first.
    pub const ALL: [Self; 24] = [
        Self::Token,
        Self::Text,
        Self::Whitespace,
        Self::Error,
        Self::Keyword,
        Self::KeywordConstant,
        Self::KeywordDeclaration,
        Self::KeywordNamespace,
        Self::KeywordType,
        Self::Name,
        Self::NameAttribute,
        Self::NameBuiltin,
        Self::NameClass,
        Self::NameDecorator,
        Self::NameFunction,
        Self::NameTag,
        Self::Literal,
        Self::String,
        Self::StringEscape,
        Self::Number,
        Self::Operator,
        Self::Punctuation,
        Self::Comment,
        Self::CommentPreproc,
    ];

    /// The next more general kind, `None` for the root.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        Some(match self {
            Self::Token => return None,
            Self::Text
            | Self::Error
            | Self::Keyword
            | Self::Name
            | Self::Literal
            | Self::Operator
            | Self::Punctuation
            | Self::Comment => Self::Token,
            Self::Whitespace => Self::Text,
            Self::KeywordConstant
            | Self::KeywordDeclaration
            | Self::KeywordNamespace
            | Self::KeywordType => Self::Keyword,
            Self::NameAttribute
            | Self::NameBuiltin
            | Self::NameClass
            | Self::NameDecorator
            | Self::NameFunction
            | Self::NameTag => Self::Name,
            Self::String | Self::Number => Self::Literal,
            Self::StringEscape => Self::String,
            Self::CommentPreproc => Self::Comment,
        })
    }

    /// Last path segment of the dotted name.
    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Token => "Token",
            Self::Text => "Text",
            Self::Whitespace => "Whitespace",
            Self::Error => "Error",
            Self::Keyword => "Keyword",
            Self::KeywordConstant => "Constant",
            Self::KeywordDeclaration => "Declaration",
            Self::KeywordNamespace => "Namespace",
            Self::KeywordType => "Type",
            Self::Name => "Name",
            Self::NameAttribute => "Attribute",
            Self::NameBuiltin => "Builtin",
            Self::NameClass => "Class",
            Self::NameDecorator => "Decorator",
            Self::NameFunction => "Function",
            Self::NameTag => "Tag",
            Self::Literal => "Literal",
            Self::String => "String",
            Self::StringEscape => "Escape",
            Self::Number => "Number",
            Self::Operator => "Operator",
            Self::Punctuation => "Punctuation",
            Self::Comment => "Comment",
            Self::CommentPreproc => "Preproc",
        }
    }

    /// This kind and all its ancestors, most specific first.
    pub fn lineage(self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(self), |kind| kind.parent())
    }

    /// True if `self` is `other` or descends from it.
    #[must_use]
    pub fn is_a(self, other: Self) -> bool {
        self.lineage().any(|kind| kind == other)
    }
}

/// Full dotted path, e.g. `Token.Literal.String.Escape`.
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut path: Vec<&str> = self.lineage().map(Self::segment).collect();
        path.reverse();
        f.write_str(&path.join("."))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_no_parent() {
        assert_eq!(TokenKind::Token.parent(), None);
    }

    #[test]
    fn every_kind_reaches_root() {
        for kind in TokenKind::ALL {
            assert_eq!(kind.lineage().last(), Some(TokenKind::Token), "{kind:?}");
        }
    }

    #[test]
    fn dotted_names() {
        assert_eq!(TokenKind::Token.to_string(), "Token");
        assert_eq!(TokenKind::Keyword.to_string(), "Token.Keyword");
        assert_eq!(TokenKind::StringEscape.to_string(), "Token.Literal.String.Escape");
        assert_eq!(TokenKind::Whitespace.to_string(), "Token.Text.Whitespace");
        assert_eq!(TokenKind::CommentPreproc.to_string(), "Token.Comment.Preproc");
    }

    #[test]
    fn is_a_follows_hierarchy() {
        assert!(TokenKind::KeywordType.is_a(TokenKind::Keyword));
        assert!(TokenKind::Number.is_a(TokenKind::Literal));
        assert!(!TokenKind::Number.is_a(TokenKind::String));
        assert!(TokenKind::Operator.is_a(TokenKind::Operator));
    }
}
