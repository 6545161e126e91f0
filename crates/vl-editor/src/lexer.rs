//! Lexing via tree-sitter highlight queries.
//!
//! A [`Lexer`] turns the whole buffer into an ordered list of
//! `(TokenKind, &str)` pairs whose texts concatenate back to the input,
//! byte for byte. [`TreeSitterLexer`] parses with the language's grammar and
//! runs the grammar's highlight query over the tree:
//!
//! - each capture name (`@keyword`, `@string.escape`, ...) maps to a
//!   [`TokenKind`], falling back through its dotted prefixes;
//! - captures are painted onto the source bytes widest first, so a capture
//!   on an inner node overrides its enclosing node, and among captures of
//!   one node the later pattern wins;
//! - leaves inside `ERROR` nodes are painted as [`TokenKind::Error`] first,
//!   so anything the query still recognizes keeps its color;
//! - uncaptured text becomes `Whitespace` or `Text` runs, so nothing is
//!   ever dropped.

use std::borrow::Cow;
use std::cmp::Reverse;
use std::fmt;
use std::ops::Range;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Parser, Query, QueryCursor, Tree};
use vl_theme::TokenKind;

use crate::error::HighlightError;

/// One lexed token, borrowed from the input.
pub type Token<'a> = (TokenKind, &'a str);

/// Anything that can split text into tokens.
pub trait Lexer {
    /// Canonical language name.
    fn name(&self) -> &'static str;

    /// Tokenize `text`. The token texts concatenate to `text` exactly.
    ///
    /// # Errors
    ///
    /// [`HighlightError::Parse`] if the text could not be parsed at all.
    fn tokenize<'a>(&mut self, text: &'a str) -> Result<Vec<Token<'a>>, HighlightError>;
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// A language with a bundled grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    JavaScript,
    Java,
    C,
    Cpp,
    Fortran,
    Go,
    Bash,
    Rust,
}

impl Language {
    pub const ALL: [Self; 9] = [
        Self::Python,
        Self::JavaScript,
        Self::Java,
        Self::C,
        Self::Cpp,
        Self::Fortran,
        Self::Go,
        Self::Bash,
        Self::Rust,
    ];

    /// Resolve a name or alias, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.trim().to_ascii_lowercase().as_str() {
            "python" | "py" | "python3" => Self::Python,
            "javascript" | "js" => Self::JavaScript,
            "java" => Self::Java,
            "c" => Self::C,
            "cpp" | "c++" => Self::Cpp,
            "fortran" | "f90" => Self::Fortran,
            "go" | "golang" => Self::Go,
            "bash" | "sh" => Self::Bash,
            "rust" | "rs" => Self::Rust,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::Java => "java",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Fortran => "fortran",
            Self::Go => "go",
            Self::Bash => "bash",
            Self::Rust => "rust",
        }
    }

    /// The tree-sitter grammar.
    #[must_use]
    pub fn grammar(self) -> tree_sitter::Language {
        match self {
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::Java => tree_sitter_java::LANGUAGE.into(),
            Self::C => tree_sitter_c::LANGUAGE.into(),
            Self::Cpp => tree_sitter_cpp::LANGUAGE.into(),
            Self::Fortran => tree_sitter_fortran::LANGUAGE.into(),
            Self::Go => tree_sitter_go::LANGUAGE.into(),
            Self::Bash => tree_sitter_bash::LANGUAGE.into(),
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
        }
    }

    /// The highlight query source. C++ layers its own patterns over C's;
    /// Fortran's crate ships no query, so a small one lives here.
    #[must_use]
    pub fn highlight_query(self) -> Cow<'static, str> {
        match self {
            Self::Python => Cow::Borrowed(tree_sitter_python::HIGHLIGHTS_QUERY),
            Self::JavaScript => Cow::Borrowed(tree_sitter_javascript::HIGHLIGHT_QUERY),
            Self::Java => Cow::Borrowed(tree_sitter_java::HIGHLIGHTS_QUERY),
            Self::C => Cow::Borrowed(tree_sitter_c::HIGHLIGHT_QUERY),
            Self::Cpp => Cow::Owned(
                [tree_sitter_c::HIGHLIGHT_QUERY, tree_sitter_cpp::HIGHLIGHT_QUERY].join("\n"),
            ),
            Self::Fortran => Cow::Borrowed(FORTRAN_HIGHLIGHTS),
            Self::Go => Cow::Borrowed(tree_sitter_go::HIGHLIGHTS_QUERY),
            Self::Bash => Cow::Borrowed(tree_sitter_bash::HIGHLIGHT_QUERY),
            Self::Rust => Cow::Borrowed(tree_sitter_rust::HIGHLIGHTS_QUERY),
        }
    }
}

const FORTRAN_HIGHLIGHTS: &str = r#"
(identifier) @variable
(string_literal) @string
(number_literal) @number
(boolean_literal) @constant.builtin
(comment) @comment

[
  (intrinsic_type)
  "allocatable"
  "dimension"
  "in"
  "inout"
  "intent"
  "optional"
  "out"
  "pointer"
  "type"
] @type

[
  "contains"
  "private"
  "public"
  "use"
  "only"
] @include

[
  (none)
  "call"
  "cycle"
  "do"
  "else"
  "elseif"
  "end"
  "enddo"
  "endfunction"
  "endif"
  "endmodule"
  "endprogram"
  "endsubroutine"
  "exit"
  "function"
  "if"
  "implicit"
  "module"
  "parameter"
  "print"
  "program"
  "read"
  "return"
  "stop"
  "subroutine"
  "then"
  "while"
  "write"
] @keyword

["*" "+" "-" "/" "=" "<" ">" "<=" ">=" "==" "/="] @operator
["(" ")" "[" "]"] @punctuation.bracket
["::" "," "%"] @punctuation.delimiter

(program_statement (name) @namespace)
(end_program_statement (name) @namespace)
(module_statement (name) @namespace)
(end_module_statement (name) @namespace)
(function_statement (name) @function)
(end_function_statement (name) @function)
(subroutine_statement (name) @function)
(end_subroutine_statement (name) @function)
(subroutine_call (identifier) @function)
"#;

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexer for `name`.
///
/// # Errors
///
/// [`HighlightError::UnknownLanguage`] for names no grammar answers to, and
/// [`HighlightError::Grammar`] if the grammar will not load.
pub fn lexer_for(name: &str) -> Result<TreeSitterLexer, HighlightError> {
    let language =
        Language::from_name(name).ok_or_else(|| HighlightError::UnknownLanguage(name.to_string()))?;
    TreeSitterLexer::new(language)
}

// ---------------------------------------------------------------------------
// TreeSitterLexer
// ---------------------------------------------------------------------------

/// A [`Lexer`] over one tree-sitter grammar and its highlight query. Keeps
/// its parser between runs.
pub struct TreeSitterLexer {
    language: Language,
    parser: Parser,
    query: Query,
    /// Token kind per capture index; `None` for captures left uncolored.
    kinds: Vec<Option<TokenKind>>,
}

impl fmt::Debug for TreeSitterLexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeSitterLexer")
            .field("language", &self.language)
            .field("captures", &self.kinds.len())
            .finish_non_exhaustive()
    }
}

impl TreeSitterLexer {
    /// # Errors
    ///
    /// [`HighlightError::Grammar`] if the grammar's ABI does not match the
    /// tree-sitter runtime or its highlight query does not compile.
    pub fn new(language: Language) -> Result<Self, HighlightError> {
        let grammar_error = |reason: String| HighlightError::Grammar {
            language: language.name().to_string(),
            reason,
        };

        let grammar = language.grammar();
        let mut parser = Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|err| grammar_error(err.to_string()))?;
        let query = Query::new(&grammar, &language.highlight_query())
            .map_err(|err| grammar_error(err.to_string()))?;
        let kinds = query
            .capture_names()
            .iter()
            .map(|name| capture_kind(name))
            .collect();

        Ok(Self {
            language,
            parser,
            query,
            kinds,
        })
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Paint every mapped capture in `tree` onto `canvas`: widest ranges
    /// first, then by pattern index.
    fn paint_captures(&self, tree: &Tree, text: &str, canvas: &mut Canvas) {
        let mut layers = Vec::new();
        let mut cursor = QueryCursor::new();
        let mut captures = cursor.captures(&self.query, tree.root_node(), text.as_bytes());
        while let Some((m, index)) = captures.next() {
            let capture = m.captures[*index];
            if let Some(kind) = self.kinds[capture.index as usize] {
                layers.push((m.pattern_index, kind, capture.node.byte_range()));
            }
        }

        layers.sort_by_key(|(pattern, _, range)| (Reverse(range.len()), *pattern));
        for (_, kind, range) in layers {
            canvas.paint(kind, range);
        }
    }
}

impl Lexer for TreeSitterLexer {
    fn name(&self) -> &'static str {
        self.language.name()
    }

    fn tokenize<'a>(&mut self, text: &'a str) -> Result<Vec<Token<'a>>, HighlightError> {
        let tree = self
            .parser
            .parse(text, None)
            .ok_or_else(|| HighlightError::Parse(self.language.name().to_string()))?;

        let mut canvas = Canvas::new(text.len());
        for range in error_leaves(&tree) {
            canvas.paint(TokenKind::Error, range);
        }
        self.paint_captures(&tree, text, &mut canvas);

        let mut out = Tokens {
            text,
            pos: 0,
            tokens: Vec::new(),
        };
        for (kind, range) in canvas.runs() {
            out.emit(kind, range.start, range.end);
        }
        out.gap_to(text.len());
        Ok(out.tokens)
    }
}

// ---------------------------------------------------------------------------
// Painting
// ---------------------------------------------------------------------------

/// Per-byte owner table: which painted span each source byte belongs to.
/// Painting a span replaces the owner of every byte it covers.
struct Canvas {
    owners: Vec<Option<usize>>,
    spans: Vec<TokenKind>,
}

impl Canvas {
    fn new(len: usize) -> Self {
        Self {
            owners: vec![None; len],
            spans: Vec::new(),
        }
    }

    fn paint(&mut self, kind: TokenKind, range: Range<usize>) {
        let end = range.end.min(self.owners.len());
        if range.start >= end {
            return;
        }
        let id = self.spans.len();
        self.spans.push(kind);
        self.owners[range.start..end].fill(Some(id));
    }

    /// Maximal runs of bytes owned by one span, in source order.
    fn runs(&self) -> Vec<(TokenKind, Range<usize>)> {
        let mut runs = Vec::new();
        let mut start = 0;
        while start < self.owners.len() {
            let owner = self.owners[start];
            let end = self.owners[start..]
                .iter()
                .position(|o| *o != owner)
                .map_or(self.owners.len(), |n| start + n);
            if let Some(id) = owner {
                runs.push((self.spans[id], start..end));
            }
            start = end;
        }
        runs
    }
}

/// Byte ranges of the leaves under `ERROR` nodes, found with an explicit
/// cursor loop so nesting depth never touches the call stack. Subtrees
/// without errors are skipped.
fn error_leaves(tree: &Tree) -> Vec<Range<usize>> {
    let mut leaves = Vec::new();
    if !tree.root_node().has_error() {
        return leaves;
    }

    let mut cursor = tree.walk();
    // Whether each ancestor of the cursor's node is inside an ERROR node.
    let mut inside = Vec::new();
    loop {
        let node = cursor.node();
        let in_error = node.is_error() || inside.last().copied().unwrap_or(false);

        if (in_error || node.has_error()) && cursor.goto_first_child() {
            inside.push(in_error);
            continue;
        }
        if in_error && node.child_count() == 0 && !node.is_missing() {
            leaves.push(node.byte_range());
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return leaves;
            }
            inside.pop();
        }
    }
}

// ---------------------------------------------------------------------------
// Token accumulation
// ---------------------------------------------------------------------------

/// Token accumulator with a byte cursor into the source.
struct Tokens<'a> {
    text: &'a str,
    pos: usize,
    tokens: Vec<Token<'a>>,
}

impl<'a> Tokens<'a> {
    /// Emit `[start, end)` as `kind`, filling any gap before it. Ranges that
    /// are empty, overlap what was already emitted, or split a char are
    /// skipped; the gap fill picks their text up later.
    fn emit(&mut self, kind: TokenKind, start: usize, end: usize) {
        if start < self.pos
            || end <= start
            || end > self.text.len()
            || !self.text.is_char_boundary(start)
            || !self.text.is_char_boundary(end)
        {
            return;
        }
        self.gap_to(start);
        let slice = &self.text[start..end];
        let kind = if slice.chars().all(char::is_whitespace) {
            TokenKind::Whitespace
        } else {
            refine(kind, slice)
        };
        self.tokens.push((kind, slice));
        self.pos = end;
    }

    /// Cover `[pos, end)` with alternating whitespace and text runs.
    fn gap_to(&mut self, end: usize) {
        if end <= self.pos {
            return;
        }
        let gap = &self.text[self.pos..end];
        let mut run_start = 0;
        let mut run_ws = None;
        for (i, ch) in gap.char_indices() {
            let ws = ch.is_whitespace();
            if run_ws.is_some_and(|prev| prev != ws) {
                self.tokens.push((gap_kind(run_ws), &gap[run_start..i]));
                run_start = i;
            }
            run_ws = Some(ws);
        }
        if run_start < gap.len() {
            self.tokens.push((gap_kind(run_ws), &gap[run_start..]));
        }
        self.pos = end;
    }
}

const fn gap_kind(whitespace: Option<bool>) -> TokenKind {
    match whitespace {
        Some(true) => TokenKind::Whitespace,
        _ => TokenKind::Text,
    }
}

// ---------------------------------------------------------------------------
// Capture names
// ---------------------------------------------------------------------------

const NAMESPACE_KEYWORDS: &[&str] = &["import", "from", "package", "use", "module"];

/// Map a capture name to a token kind. Dotted names fall back to their
/// prefix: `function.method` is a `function` unless listed on its own.
fn capture_kind(name: &str) -> Option<TokenKind> {
    let mut name = name;
    loop {
        if let Some(kind) = capture_kind_exact(name) {
            return Some(kind);
        }
        name = name.rsplit_once('.')?.0;
    }
}

fn capture_kind_exact(name: &str) -> Option<TokenKind> {
    Some(match name {
        "keyword" | "conditional" | "repeat" => TokenKind::Keyword,
        "keyword.operator" | "operator" => TokenKind::Operator,
        "include" => TokenKind::KeywordNamespace,
        "type" => TokenKind::KeywordType,
        "constructor" => TokenKind::NameClass,
        "function" => TokenKind::NameFunction,
        "function.builtin" | "variable.builtin" => TokenKind::NameBuiltin,
        "constant.builtin" | "boolean" => TokenKind::KeywordConstant,
        "constant" | "variable" | "parameter" | "namespace" | "label" => TokenKind::Name,
        "property" => TokenKind::NameAttribute,
        "attribute" => TokenKind::NameDecorator,
        "tag" => TokenKind::NameTag,
        "string" => TokenKind::String,
        "escape" | "string.escape" => TokenKind::StringEscape,
        "number" => TokenKind::Number,
        "comment" => TokenKind::Comment,
        "punctuation" | "delimiter" => TokenKind::Punctuation,
        _ => return None,
    })
}

/// Sharpen a generic keyword by its text: import-style keywords and
/// preprocessor directives get their own kinds.
fn refine(kind: TokenKind, text: &str) -> TokenKind {
    if kind != TokenKind::Keyword {
        return kind;
    }
    if text.starts_with('#') {
        TokenKind::CommentPreproc
    } else if NAMESPACE_KEYWORDS.contains(&text) {
        TokenKind::KeywordNamespace
    } else {
        kind
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
