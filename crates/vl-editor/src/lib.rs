//! # vl-editor: editor core for vimlet
//!
//! - **[`session`]**: the modal state machine; keys in, [`session::Effect`]s out
//! - **[`command`]**: `:w`, `:q`, `:wq` and `:setlang` parsing
//! - **[`mode`]**: `Normal`, `Insert`, `Command` and the cursor width each asks for
//! - **[`host`]**: the [`host::TextHost`] seam and the terminal [`host::TextView`]
//! - **[`buffer`]**: rope-backed text with char/position conversion
//! - **[`lexer`]**: tree-sitter tokenizing into [`vl_theme::TokenKind`]s
//! - **[`highlight`]**: full-buffer highlight passes onto host tags
//! - **[`editor`]**: applies effects to the host, files and highlighter
//! - **[`view`]**: paints an editor into a frame
//! - **[`io`]**, **[`error`]**, **[`position`]**: plumbing

pub mod buffer;
pub mod command;
pub mod editor;
pub mod error;
pub mod highlight;
pub mod host;
pub mod io;
pub mod lexer;
pub mod mode;
pub mod position;
pub mod session;
pub mod view;
