//! The editor: a [`Session`] wired to a [`TextHost`].
//!
//! The session decides, the editor does. Every key goes to
//! [`Session::handle_key`], and the returned [`Effect`]s are applied here in
//! order: cursor moves and edits on the host, highlight passes, file reads
//! and writes. Failures never escape; they become a [`Message`] on the
//! message line and the editor carries on.

use std::path::{Path, PathBuf};

use vl_term::input::KeyEvent;

use crate::error::EditorError;
use crate::highlight::Highlighter;
use crate::host::TextHost;
use crate::io;
use crate::mode::Mode;
use crate::session::{Effect, PromptKind, Session};

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

/// One line of feedback, shown until the next key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

impl Message {
    fn info(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Info,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// Modal editing over a text host.
#[derive(Debug)]
pub struct Editor<H: TextHost> {
    host: H,
    session: Session,
    highlighter: Highlighter,
    path: Option<PathBuf>,
    status: String,
    message: Option<Message>,
    quit: bool,
}

impl<H: TextHost> Editor<H> {
    /// An editor in normal mode with the default language, highlighted once.
    pub fn new(host: H) -> Self {
        let mut editor = Self {
            host,
            session: Session::default(),
            highlighter: Highlighter::new(),
            path: None,
            status: String::new(),
            message: None,
            quit: false,
        };
        editor.rehighlight();
        editor
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    #[inline]
    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[inline]
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.session.mode()
    }

    #[inline]
    #[must_use]
    pub fn language(&self) -> &str {
        self.session.language()
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Status bar text. Empty means "show the mode".
    #[inline]
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    #[inline]
    #[must_use]
    pub const fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    #[inline]
    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.quit
    }

    // -- Input --------------------------------------------------------------

    /// Run one key through the session and apply what it decided.
    pub fn handle_key(&mut self, key: &KeyEvent) {
        self.message = None;
        for effect in self.session.handle_key(key) {
            self.apply(effect);
        }
    }

    /// Bracketed paste: into the open prompt if there is one, else into the
    /// text when in insert mode. Ignored otherwise.
    pub fn handle_paste(&mut self, text: &str) {
        if self.session.paste_into_prompt(text) {
            return;
        }
        if self.session.mode() == Mode::Insert && !text.is_empty() {
            self.host.insert_text(text);
            self.rehighlight();
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::MoveCursor { dx, dy } => {
                let (line, col) = self.host.cursor().offset(dx, dy);
                self.host.set_cursor(line, col);
            }
            Effect::CursorWidth(width) => self.host.set_cursor_width(width),
            Effect::Status(text) => self.status = text,
            Effect::ClearStatus => self.status.clear(),
            Effect::PassThrough(key) => {
                if self.host.default_key(&key) {
                    self.rehighlight();
                }
            }
            Effect::Save { path, then_quit } => self.save(path, then_quit),
            Effect::Quit => self.quit = true,
            Effect::SetLanguage { language, hint } => {
                if let Err(err) = self.set_language(&language, hint) {
                    tracing::debug!(%language, error = %err, "language unchanged");
                }
            }
            Effect::Open(path) => {
                if let Err(err) = self.open(&path) {
                    tracing::debug!(path = %path.display(), error = %err, "open failed");
                }
            }
            Effect::Error(text) => self.message = Some(Message::error(text)),
        }
    }

    // -- Operations ---------------------------------------------------------

    /// Replace the text with the file at `path`, cursor at the start.
    ///
    /// # Errors
    ///
    /// Returns the read error, which is also shown as a message. The text is
    /// left alone in that case.
    pub fn open(&mut self, path: &Path) -> Result<(), EditorError> {
        let text = io::read_file(path).map_err(|e| self.report(e))?;
        self.host.set_text(&text);
        self.host.set_cursor(0, 0);
        self.host.mark_saved();
        self.path = Some(path.to_path_buf());
        self.rehighlight();
        Ok(())
    }

    /// Open `path` if it exists, otherwise start empty with `path` as the
    /// save target.
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub fn open_or_create(&mut self, path: &Path) -> Result<(), EditorError> {
        if path.exists() {
            return self.open(path);
        }
        tracing::info!(path = %path.display(), "new file");
        self.path = Some(path.to_path_buf());
        self.message = Some(Message::info(format!("\"{}\" [New File]", path.display())));
        Ok(())
    }

    /// Write the text to `path`, or to the current file when `path` is
    /// `None`. With neither, ask for a name and finish when it is given.
    ///
    /// A successful write makes its path current. `then_quit` takes effect
    /// only if the write succeeds.
    pub fn save(&mut self, path: Option<PathBuf>, then_quit: bool) {
        let Some(target) = path.or_else(|| self.path.clone()) else {
            self.session.open_prompt(PromptKind::SaveAs { then_quit }, "");
            return;
        };

        match io::write_file(&target, &self.host.text()) {
            Ok(()) => {
                self.host.mark_saved();
                self.message = Some(Message::info(format!("\"{}\" written", target.display())));
                self.path = Some(target);
                if then_quit {
                    self.quit = true;
                }
            }
            Err(err) => {
                self.report(err);
            }
        }
    }

    /// Highlight with `language` and make it current if that works.
    ///
    /// On success the status bar names the language, and with `hint` the
    /// message line explains how to change it again.
    ///
    /// # Errors
    ///
    /// Returns the highlight error, also shown as a message. The previous
    /// language and its highlighting stay.
    pub fn set_language(&mut self, language: &str, hint: bool) -> Result<(), EditorError> {
        let report = self
            .highlighter
            .refresh(&mut self.host, language)
            .map_err(|e| self.report(e))?;
        self.session.commit_language(report.language);

        let upper = report.language.to_uppercase();
        self.status = format!("Language set to: {upper}");
        if hint {
            self.message = Some(Message::info(format!(
                "Language set to {upper}. Use :setlang <language> to change it."
            )));
        }
        Ok(())
    }

    /// Re-run highlighting with the current language.
    fn rehighlight(&mut self) {
        let language = self.session.language().to_string();
        if let Err(err) = self.highlighter.refresh(&mut self.host, &language) {
            self.report(err);
        }
    }

    /// Show `err` on the message line and hand it back.
    fn report(&mut self, err: impl Into<EditorError>) -> EditorError {
        let err = err.into();
        tracing::warn!(error = %err, "editor error");
        self.message = Some(Message::error(err.to_string()));
        err
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
