//! Command mode: the `:` line.
//!
//! `:` in normal mode opens an empty [`CommandLine`]. Printable keys append,
//! Backspace drops the last char, Enter parses the line into a [`Command`].
//!
//! | Command          | Action                                  |
//! |------------------|-----------------------------------------|
//! | `:w`             | Save to the current file path           |
//! | `:w <path>`      | Save to `<path>` and adopt it           |
//! | `:q`             | Quit                                    |
//! | `:wq`            | Save, then quit if the save worked      |
//! | `:setlang <id>`  | Switch the highlighting language        |

use std::path::PathBuf;

use crate::error::CommandError;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `:w`
    Write,

    /// `:w <path>`
    WriteAs(PathBuf),

    /// `:q`
    Quit,

    /// `:wq`
    WriteQuit,

    /// `:setlang <id>`; only the first word after the command counts.
    SetLang(String),
}

impl Command {
    /// Parse one command line (without the leading `:`).
    ///
    /// # Errors
    ///
    /// [`CommandError::Unknown`] with the trimmed input for anything that is
    /// not one of the commands above, the empty line included.
    pub fn parse(input: &str) -> Result<Self, CommandError> {
        let trimmed = input.trim();
        let unknown = || CommandError::Unknown(trimmed.to_string());

        if let Some(rest) = trimmed.strip_prefix("setlang ") {
            return rest
                .split_whitespace()
                .next()
                .map(|lang| Self::SetLang(lang.to_string()))
                .ok_or_else(unknown);
        }

        let (cmd, arg) = trimmed
            .find(char::is_whitespace)
            .map_or((trimmed, ""), |pos| (&trimmed[..pos], trimmed[pos..].trim_start()));

        match (cmd, arg) {
            ("w", "") => Ok(Self::Write),
            ("w", path) => Ok(Self::WriteAs(PathBuf::from(path))),
            ("q", "") => Ok(Self::Quit),
            ("wq", "") => Ok(Self::WriteQuit),
            _ => Err(unknown()),
        }
    }
}

// ---------------------------------------------------------------------------
// CommandLine
// ---------------------------------------------------------------------------

/// The text typed since `:`, without the colon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    input: String,
}

impl CommandLine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            input: String::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Append one char.
    pub fn push(&mut self, ch: char) {
        self.input.push(ch);
    }

    /// Drop the last char. Returns `false` when already empty.
    pub fn backspace(&mut self) -> bool {
        self.input.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.input.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Take the line out, leaving it empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.input)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn unknown(s: &str) -> Result<Command, CommandError> {
        Err(CommandError::Unknown(s.to_string()))
    }

    #[test]
    fn parse_basic_commands() {
        assert_eq!(Command::parse("w"), Ok(Command::Write));
        assert_eq!(Command::parse("q"), Ok(Command::Quit));
        assert_eq!(Command::parse("wq"), Ok(Command::WriteQuit));
    }

    #[test]
    fn parse_trims_surrounding_space() {
        assert_eq!(Command::parse("  wq \t"), Ok(Command::WriteQuit));
    }

    #[test]
    fn parse_write_with_path() {
        assert_eq!(
            Command::parse("w  notes/todo.txt"),
            Ok(Command::WriteAs(PathBuf::from("notes/todo.txt")))
        );
    }

    #[test]
    fn parse_setlang_takes_first_word() {
        assert_eq!(Command::parse("setlang go"), Ok(Command::SetLang("go".into())));
        assert_eq!(
            Command::parse("setlang  rust please"),
            Ok(Command::SetLang("rust".into()))
        );
    }

    #[test]
    fn bare_setlang_is_unknown() {
        // Trimming eats the space the prefix needs.
        assert_eq!(Command::parse("setlang "), unknown("setlang"));
    }

    #[test]
    fn unknown_commands_keep_trimmed_text() {
        assert_eq!(Command::parse("frob"), unknown("frob"));
        assert_eq!(Command::parse("q now"), unknown("q now"));
        assert_eq!(Command::parse("setlangx go"), unknown("setlangx go"));
        assert_eq!(Command::parse("   "), unknown(""));
    }

    #[test]
    fn command_line_editing() {
        let mut line = CommandLine::new();
        assert!(!line.backspace());
        line.push('w');
        line.push('q');
        assert_eq!(line.input(), "wq");
        assert!(line.backspace());
        assert_eq!(line.input(), "w");
        assert_eq!(line.take(), "w");
        assert!(line.is_empty());
    }
}
