//! The modal state machine.
//!
//! A [`Session`] owns the mode, the command line, the highlighting language
//! and an optional prompt. [`Session::handle_key`] decides what a key means
//! and returns the consequences as a list of [`Effect`]s; it never touches
//! the text view or the file system itself. The
//! [`Editor`](crate::editor::Editor) applies the effects.
//!
//! ```text
//!            i                      :
//!   Normal ─────▶ Insert   Normal ─────▶ Command
//!     ▲             │        ▲              │
//!     └─── Esc ─────┘        └─ Esc/Enter ──┘
//! ```
//!
//! Prompts (language, open, save-as) float over the current mode. While one
//! is open it gets every key; the mode underneath does not change.

use std::path::PathBuf;

use vl_term::input::{KeyCode, KeyEvent};

use crate::command::{Command, CommandLine};
use crate::mode::{CursorWidth, Mode};

/// Language the editor starts with.
pub const DEFAULT_LANGUAGE: &str = "python";

/// Languages the language prompt accepts. `:setlang` takes any language the
/// lexer knows; the prompt is deliberately narrower.
pub const PROMPT_LANGUAGES: [&str; 8] =
    ["python", "javascript", "java", "c", "cpp", "fortran", "go", "bash"];

/// Status bar prefix while typing a command.
pub const COMMAND_PREFIX: &str = "COMMAND MODE: ";

// ---------------------------------------------------------------------------
// Effect
// ---------------------------------------------------------------------------

/// Something the editor must do as the result of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Move the text cursor by a delta. The text view clamps.
    MoveCursor { dx: isize, dy: isize },

    /// Change the cursor width hint.
    CursorWidth(CursorWidth),

    /// Replace the status bar text.
    Status(String),

    /// Blank the status bar text.
    ClearStatus,

    /// Hand the key to the text view's own editing.
    PassThrough(KeyEvent),

    /// Save the buffer. `path: None` means the current file; with no current
    /// file the editor opens a save-as prompt instead.
    Save { path: Option<PathBuf>, then_quit: bool },

    Quit,

    /// Re-highlight with `language`; commit it only if that succeeds.
    /// `hint` adds the usage hint the language prompt shows.
    SetLanguage { language: String, hint: bool },

    /// Replace the buffer with a file.
    Open(PathBuf),

    /// Show an error on the message line.
    Error(String),
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// What a prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Language,
    Open,
    SaveAs { then_quit: bool },
}

impl PromptKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Language => "Select language: ",
            Self::Open => "Open file: ",
            Self::SaveAs { .. } => "Save as: ",
        }
    }
}

/// A one-line question on the message line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

impl Prompt {
    /// Turn the submitted input into effects.
    fn submit(self) -> Vec<Effect> {
        let answer = self.input.trim();
        match self.kind {
            PromptKind::Language => {
                let lang = answer.to_lowercase();
                if PROMPT_LANGUAGES.contains(&lang.as_str()) {
                    vec![Effect::SetLanguage {
                        language: lang,
                        hint: true,
                    }]
                } else {
                    vec![Effect::Error("Invalid language selected.".into())]
                }
            }
            _ if answer.is_empty() => Vec::new(),
            PromptKind::Open => vec![Effect::Open(PathBuf::from(answer))],
            PromptKind::SaveAs { then_quit } => vec![Effect::Save {
                path: Some(PathBuf::from(answer)),
                then_quit,
            }],
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Per-editor modal state.
#[derive(Debug, Clone)]
pub struct Session {
    mode: Mode,
    cmdline: CommandLine,
    language: String,
    prompt: Option<Prompt>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl Session {
    /// A session in normal mode with `language` as the current language.
    ///
    /// The caller is responsible for `language` being resolvable; the
    /// editor checks it with a highlight pass before committing.
    #[must_use]
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            mode: Mode::Normal,
            cmdline: CommandLine::new(),
            language: language.into(),
            prompt: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub fn command_line(&self) -> &str {
        self.cmdline.input()
    }

    #[inline]
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[inline]
    #[must_use]
    pub const fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    /// Record `language` as current. Called after it highlighted cleanly.
    pub fn commit_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
        tracing::info!(language = %self.language, "language committed");
    }

    /// Open a prompt, replacing any open one.
    pub fn open_prompt(&mut self, kind: PromptKind, initial: impl Into<String>) {
        tracing::debug!(?kind, "prompt opened");
        self.prompt = Some(Prompt {
            kind,
            input: initial.into(),
        });
    }

    /// Append pasted text to the open prompt, first line only. Returns
    /// `false` if no prompt is open.
    pub fn paste_into_prompt(&mut self, text: &str) -> bool {
        let Some(prompt) = self.prompt.as_mut() else {
            return false;
        };
        let line = text.lines().next().unwrap_or_default();
        prompt.input.extend(line.chars().filter(|c| !c.is_control()));
        true
    }

    /// Decide what `key` does.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Vec<Effect> {
        if self.prompt.is_some() {
            return self.prompt_key(key);
        }

        if key.code == KeyCode::Escape {
            return self.to_normal();
        }

        if self.mode != Mode::Command {
            if key.is_ctrl('l') {
                self.open_prompt(PromptKind::Language, self.language.clone());
                return Vec::new();
            }
            if key.is_ctrl('o') {
                self.open_prompt(PromptKind::Open, "");
                return Vec::new();
            }
        }

        match self.mode {
            Mode::Normal => self.normal_key(key),
            Mode::Insert => vec![Effect::PassThrough(*key)],
            Mode::Command => self.command_key(key),
        }
    }

    fn normal_key(&mut self, key: &KeyEvent) -> Vec<Effect> {
        let (dx, dy) = match key.printable() {
            Some('i') => {
                self.set_mode(Mode::Insert);
                return vec![Effect::ClearStatus, Effect::CursorWidth(CursorWidth::Wide)];
            }
            Some(':') => {
                self.set_mode(Mode::Command);
                self.cmdline.clear();
                return vec![Effect::Status(COMMAND_PREFIX.to_string())];
            }
            Some('h') => (-1, 0),
            Some('j') => (0, 1),
            Some('k') => (0, -1),
            Some('l') => (1, 0),
            _ => return Vec::new(),
        };
        vec![Effect::MoveCursor { dx, dy }]
    }

    fn command_key(&mut self, key: &KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Enter => return self.execute(),
            KeyCode::Backspace => {
                self.cmdline.backspace();
            }
            _ => match key.printable() {
                Some(ch) => self.cmdline.push(ch),
                None => return Vec::new(),
            },
        }
        vec![self.command_status()]
    }

    fn command_status(&self) -> Effect {
        Effect::Status(format!("{COMMAND_PREFIX}{}", self.cmdline.input()))
    }

    /// Run the command line and drop back to normal mode.
    ///
    /// The mode reset comes first so a message the command produces is not
    /// wiped by it.
    fn execute(&mut self) -> Vec<Effect> {
        let line = self.cmdline.take();
        let mut effects = self.to_normal();
        tracing::debug!(command = %line.trim(), "executing command");

        effects.push(match Command::parse(&line) {
            Ok(Command::Write) => Effect::Save {
                path: None,
                then_quit: false,
            },
            Ok(Command::WriteAs(path)) => Effect::Save {
                path: Some(path),
                then_quit: false,
            },
            Ok(Command::Quit) => Effect::Quit,
            Ok(Command::WriteQuit) => Effect::Save {
                path: None,
                then_quit: true,
            },
            Ok(Command::SetLang(language)) => Effect::SetLanguage {
                language,
                hint: false,
            },
            Err(err) => Effect::Error(err.to_string()),
        });
        effects
    }

    fn prompt_key(&mut self, key: &KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Escape => {
                self.prompt = None;
                Vec::new()
            }
            KeyCode::Enter => self.prompt.take().map(Prompt::submit).unwrap_or_default(),
            KeyCode::Backspace => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.input.pop();
                }
                Vec::new()
            }
            _ => {
                if let (Some(ch), Some(prompt)) = (key.printable(), self.prompt.as_mut()) {
                    prompt.input.push(ch);
                }
                Vec::new()
            }
        }
    }

    fn to_normal(&mut self) -> Vec<Effect> {
        self.set_mode(Mode::Normal);
        self.cmdline.clear();
        vec![Effect::ClearStatus, Effect::CursorWidth(CursorWidth::Thin)]
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            tracing::debug!(from = %self.mode, to = %mode, "mode change");
            self.mode = mode;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(ch: char) -> KeyEvent {
        KeyEvent::char(ch)
    }

    fn esc() -> KeyEvent {
        KeyEvent::new(KeyCode::Escape)
    }

    fn enter() -> KeyEvent {
        KeyEvent::new(KeyCode::Enter)
    }

    fn backspace() -> KeyEvent {
        KeyEvent::new(KeyCode::Backspace)
    }

    fn type_command(session: &mut Session, text: &str) -> Vec<Effect> {
        session.handle_key(&key(':'));
        for ch in text.chars() {
            session.handle_key(&key(ch));
        }
        session.handle_key(&enter())
    }

    // -- Mode transitions ---------------------------------------------------

    #[test]
    fn starts_in_normal_with_python() {
        let s = Session::default();
        assert_eq!(s.mode(), Mode::Normal);
        assert_eq!(s.language(), "python");
        assert!(s.prompt().is_none());
    }

    #[test]
    fn i_enters_insert_with_wide_cursor() {
        let mut s = Session::default();
        let fx = s.handle_key(&key('i'));
        assert_eq!(s.mode(), Mode::Insert);
        assert!(fx.contains(&Effect::CursorWidth(CursorWidth::Wide)));
    }

    #[test]
    fn escape_from_anywhere_reaches_normal() {
        for setup in ["i", ":", ":abc", ""] {
            let mut s = Session::default();
            for ch in setup.chars() {
                s.handle_key(&key(ch));
            }
            let fx = s.handle_key(&esc());
            assert_eq!(s.mode(), Mode::Normal, "after {setup:?}");
            assert_eq!(fx, vec![Effect::ClearStatus, Effect::CursorWidth(CursorWidth::Thin)]);
            assert_eq!(s.command_line(), "");
        }
    }

    #[test]
    fn insert_passes_keys_through() {
        let mut s = Session::default();
        s.handle_key(&key('i'));
        for k in [key(':'), key('h'), enter(), backspace()] {
            assert_eq!(s.handle_key(&k), vec![Effect::PassThrough(k)]);
        }
        assert_eq!(s.mode(), Mode::Insert);
    }

    #[test]
    fn insert_then_escape_is_normal_whatever_was_typed() {
        let mut s = Session::default();
        s.handle_key(&key('i'));
        for ch in "def f(): pass".chars() {
            s.handle_key(&key(ch));
        }
        s.handle_key(&esc());
        assert_eq!(s.mode(), Mode::Normal);
    }

    // -- Normal mode ---------------------------------------------------------

    #[test]
    fn hjkl_move_by_one() {
        let mut s = Session::default();
        let moves: Vec<_> = "hjkl".chars().flat_map(|c| s.handle_key(&key(c))).collect();
        assert_eq!(
            moves,
            vec![
                Effect::MoveCursor { dx: -1, dy: 0 },
                Effect::MoveCursor { dx: 0, dy: 1 },
                Effect::MoveCursor { dx: 0, dy: -1 },
                Effect::MoveCursor { dx: 1, dy: 0 },
            ]
        );
        assert_eq!(s.mode(), Mode::Normal);
    }

    #[test]
    fn other_normal_keys_are_ignored() {
        let mut s = Session::default();
        assert!(s.handle_key(&key('x')).is_empty());
        assert!(s.handle_key(&KeyEvent::new(KeyCode::Up)).is_empty());
        assert!(s.handle_key(&enter()).is_empty());
        assert_eq!(s.mode(), Mode::Normal);
    }

    // -- Command line --------------------------------------------------------

    #[test]
    fn colon_starts_empty_command_line() {
        let mut s = Session::default();
        let fx = s.handle_key(&key(':'));
        assert_eq!(s.mode(), Mode::Command);
        assert_eq!(s.command_line(), "");
        assert_eq!(fx, vec![Effect::Status("COMMAND MODE: ".into())]);
    }

    #[test]
    fn typed_chars_append_and_update_status() {
        let mut s = Session::default();
        s.handle_key(&key(':'));
        s.handle_key(&key('w'));
        let fx = s.handle_key(&key('q'));
        assert_eq!(s.command_line(), "wq");
        assert_eq!(fx, vec![Effect::Status("COMMAND MODE: wq".into())]);
    }

    #[test]
    fn backspace_on_empty_command_line_is_noop() {
        let mut s = Session::default();
        s.handle_key(&key(':'));
        let fx = s.handle_key(&backspace());
        assert_eq!(s.command_line(), "");
        assert_eq!(s.mode(), Mode::Command);
        assert_eq!(fx, vec![Effect::Status("COMMAND MODE: ".into())]);

        s.handle_key(&key('q'));
        s.handle_key(&backspace());
        s.handle_key(&backspace());
        assert_eq!(s.command_line(), "");
    }

    #[test]
    fn reentering_command_mode_clears_line() {
        let mut s = Session::default();
        s.handle_key(&key(':'));
        s.handle_key(&key('x'));
        s.handle_key(&esc());
        s.handle_key(&key(':'));
        assert_eq!(s.command_line(), "");
    }

    #[test]
    fn ctrl_keys_do_not_type_into_command_line() {
        let mut s = Session::default();
        s.handle_key(&key(':'));
        assert!(s.handle_key(&KeyEvent::ctrl('l')).is_empty());
        assert_eq!(s.command_line(), "");
        assert!(s.prompt().is_none());
    }

    // -- Execute ---------------------------------------------------------------

    fn reset() -> Vec<Effect> {
        vec![Effect::ClearStatus, Effect::CursorWidth(CursorWidth::Thin)]
    }

    fn with_reset(effect: Effect) -> Vec<Effect> {
        let mut fx = reset();
        fx.push(effect);
        fx
    }

    #[test]
    fn execute_write() {
        let mut s = Session::default();
        let fx = type_command(&mut s, "w");
        assert_eq!(fx, with_reset(Effect::Save { path: None, then_quit: false }));
        assert_eq!(s.mode(), Mode::Normal);
    }

    #[test]
    fn execute_write_as() {
        let mut s = Session::default();
        let fx = type_command(&mut s, "w out.py");
        assert_eq!(
            fx,
            with_reset(Effect::Save {
                path: Some(PathBuf::from("out.py")),
                then_quit: false
            })
        );
    }

    #[test]
    fn execute_quit() {
        let mut s = Session::default();
        assert_eq!(type_command(&mut s, "q"), with_reset(Effect::Quit));
    }

    #[test]
    fn execute_write_quit() {
        let mut s = Session::default();
        assert_eq!(
            type_command(&mut s, "wq"),
            with_reset(Effect::Save { path: None, then_quit: true })
        );
    }

    #[test]
    fn execute_setlang() {
        let mut s = Session::default();
        assert_eq!(
            type_command(&mut s, "setlang javascript"),
            with_reset(Effect::SetLanguage {
                language: "javascript".into(),
                hint: false
            })
        );
        // Not committed until the editor says so.
        assert_eq!(s.language(), "python");
    }

    #[test]
    fn execute_unknown() {
        let mut s = Session::default();
        assert_eq!(
            type_command(&mut s, "frobnicate"),
            with_reset(Effect::Error("Unknown command: frobnicate".into()))
        );
        assert_eq!(s.mode(), Mode::Normal);
        assert_eq!(s.command_line(), "");
    }

    #[test]
    fn execute_empty_line_is_unknown() {
        let mut s = Session::default();
        assert_eq!(
            type_command(&mut s, ""),
            with_reset(Effect::Error("Unknown command: ".into()))
        );
    }

    // -- Prompts ---------------------------------------------------------------

    #[test]
    fn ctrl_l_prefills_current_language() {
        let mut s = Session::default();
        s.handle_key(&KeyEvent::ctrl('l'));
        let prompt = s.prompt().unwrap();
        assert_eq!(prompt.kind, PromptKind::Language);
        assert_eq!(prompt.input, "python");
        assert_eq!(s.mode(), Mode::Normal);
    }

    #[test]
    fn language_prompt_accepts_listed_language_any_case() {
        let mut s = Session::default();
        s.handle_key(&KeyEvent::ctrl('l'));
        for _ in 0.."python".len() {
            s.handle_key(&backspace());
        }
        for ch in "FORTRAN".chars() {
            s.handle_key(&key(ch));
        }
        let fx = s.handle_key(&enter());
        assert_eq!(
            fx,
            vec![Effect::SetLanguage {
                language: "fortran".into(),
                hint: true
            }]
        );
        assert!(s.prompt().is_none());
    }

    #[test]
    fn language_prompt_rejects_unlisted_language() {
        let mut s = Session::default();
        s.open_prompt(PromptKind::Language, "rust");
        assert_eq!(
            s.handle_key(&enter()),
            vec![Effect::Error("Invalid language selected.".into())]
        );
        s.open_prompt(PromptKind::Language, "");
        assert_eq!(
            s.handle_key(&enter()),
            vec![Effect::Error("Invalid language selected.".into())]
        );
        assert_eq!(s.language(), "python");
    }

    #[test]
    fn prompt_keys_do_not_reach_the_mode() {
        let mut s = Session::default();
        s.handle_key(&key('i'));
        s.handle_key(&KeyEvent::ctrl('o'));
        assert!(s.handle_key(&key('a')).is_empty());
        assert_eq!(s.prompt().map(|p| p.input.as_str()), Some("a"));
        s.handle_key(&esc());
        assert!(s.prompt().is_none());
        // Escape closed the prompt, not insert mode.
        assert_eq!(s.mode(), Mode::Insert);
    }

    #[test]
    fn open_prompt_submits_path() {
        let mut s = Session::default();
        s.open_prompt(PromptKind::Open, "src/main.py");
        assert_eq!(
            s.handle_key(&enter()),
            vec![Effect::Open(PathBuf::from("src/main.py"))]
        );
    }

    #[test]
    fn empty_file_prompts_abort_silently() {
        let mut s = Session::default();
        s.open_prompt(PromptKind::Open, "  ");
        assert!(s.handle_key(&enter()).is_empty());
        s.open_prompt(PromptKind::SaveAs { then_quit: true }, "");
        assert!(s.handle_key(&enter()).is_empty());
        assert!(s.prompt().is_none());
    }

    #[test]
    fn save_as_prompt_carries_quit_flag() {
        let mut s = Session::default();
        s.open_prompt(PromptKind::SaveAs { then_quit: true }, "a.txt");
        assert_eq!(
            s.handle_key(&enter()),
            vec![Effect::Save {
                path: Some(PathBuf::from("a.txt")),
                then_quit: true
            }]
        );
    }

    #[test]
    fn paste_goes_to_prompt_first_line() {
        let mut s = Session::default();
        assert!(!s.paste_into_prompt("x"));
        s.open_prompt(PromptKind::Open, "");
        assert!(s.paste_into_prompt("a.py\nb.py"));
        assert_eq!(s.prompt().map(|p| p.input.as_str()), Some("a.py"));
    }

    #[test]
    fn commit_language_updates() {
        let mut s = Session::default();
        s.commit_language("go");
        assert_eq!(s.language(), "go");
    }
}
