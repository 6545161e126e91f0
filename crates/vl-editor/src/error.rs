//! Error types for the editor core.
//!
//! Nothing in here is fatal. Every error ends up as a message on the
//! message line, and the editor keeps running with its previous state.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to produce highlighting for the buffer.
#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("Could not load lexer for {0}: no lexer for alias '{0}' found")]
    UnknownLanguage(String),

    #[error("Could not load style {0}: no such theme")]
    UnknownTheme(String),

    #[error("Could not load lexer for {language}: {reason}")]
    Grammar { language: String, reason: String },

    #[error("Could not parse buffer as {0}")]
    Parse(String),
}

/// Which side of the file round trip failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Read,
    Write,
}

impl FileAction {
    const fn verb(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// An I/O failure while opening or saving a file.
#[derive(Debug, Error)]
#[error("Could not {} {}: {source}", .action.verb(), .path.display())]
pub struct FileError {
    pub action: FileAction,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl FileError {
    pub(crate) fn new(action: FileAction, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            action,
            path: path.into(),
            source,
        }
    }
}

/// A line typed in command mode that is not a command.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),
}

/// Anything the editor can report to the user.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Highlight(#[from] HighlightError),

    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Command(#[from] CommandError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unknown_command_message() {
        let err = CommandError::Unknown("frobnicate".into());
        assert_eq!(err.to_string(), "Unknown command: frobnicate");
    }

    #[test]
    fn file_error_names_path_and_action() {
        let err = FileError::new(
            FileAction::Write,
            "/nope/out.txt",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "Could not write /nope/out.txt: denied");
    }

    #[test]
    fn editor_error_is_transparent() {
        let err: EditorError = HighlightError::UnknownLanguage("klingon".into()).into();
        assert_eq!(
            err.to_string(),
            "Could not load lexer for klingon: no lexer for alias 'klingon' found"
        );
    }
}
