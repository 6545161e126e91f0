// SPDX-License-Identifier: MIT
//
// vimlet: a minimal modal text editor.
//
// This binary wires the crates together:
//
//   vl-term   → terminal control, input parsing, event loop
//   vl-editor → session, text view, highlighting, files
//   vl-theme  → the color theme the view paints with
//
// `Vimlet` implements vl-term's App trait around an `Editor<TextView>`.
// Each keypress flows through:
//
//   stdin → parser → on_event → Session::handle_key → effects → host
//   paint → view::render → framebuffer → terminal
//
// Logging goes to a file, never the terminal: `--log-file <PATH>` or the
// `VIMLET_LOG` environment variable. Without either, nothing is logged.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use clap::Parser;

use vl_editor::editor::Editor;
use vl_editor::highlight::THEME_NAME;
use vl_editor::host::TextView;
use vl_editor::session::DEFAULT_LANGUAGE;
use vl_editor::view;

use vl_term::ansi::CursorShape;
use vl_term::event_loop::{Action, App, EventLoop};
use vl_term::frame::FrameBuffer;
use vl_term::input::Event;

use vl_theme::{Theme, builtin_theme};

/// Environment variable naming the log file when `--log-file` is absent.
const LOG_ENV: &str = "VIMLET_LOG";

// ─── Command line ───────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "vimlet", version)]
#[command(about = "A minimal modal text editor with syntax highlighting")]
struct Args {
    /// File to edit. Created on first write if it does not exist.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Highlighting language
    #[arg(short, long, value_name = "LANG", default_value = DEFAULT_LANGUAGE)]
    lang: String,

    /// Write logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn setup_tracing(path: &Path, verbose: bool) -> Result<(), Box<dyn Error>> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("vimlet=trace,vl_editor=trace,vl_term=debug")
        } else {
            EnvFilter::new("info")
        }
    });
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()?;

    tracing::info!(path = %path.display(), "tracing initialized");
    Ok(())
}

// ─── App ────────────────────────────────────────────────────────────────────

/// The editor as the event loop sees it.
struct Vimlet {
    editor: Editor<TextView>,
    theme: Theme,
    cursor: Option<(u16, u16, CursorShape)>,
}

impl Vimlet {
    /// Build the editor for `args`: open the file, then switch language.
    /// An unknown language leaves the default in place with a warning.
    fn new(args: &Args, theme: Theme) -> Self {
        let mut editor = Editor::new(TextView::new());

        if let Some(path) = &args.file {
            if let Err(err) = editor.open_or_create(path) {
                tracing::debug!(path = %path.display(), error = %err, "starting with empty text");
            }
        }

        if !args.lang.eq_ignore_ascii_case(editor.language()) {
            if let Err(err) = editor.set_language(&args.lang, false) {
                tracing::warn!(lang = %args.lang, error = %err, "falling back to {DEFAULT_LANGUAGE}");
            }
        }

        Self {
            editor,
            theme,
            cursor: None,
        }
    }
}

impl App for Vimlet {
    fn on_event(&mut self, event: &Event) -> Action {
        match event {
            Event::Key(key) => self.editor.handle_key(key),
            Event::Paste(text) => self.editor.handle_paste(text),
        }
        if self.editor.should_quit() {
            Action::Quit
        } else {
            Action::Continue
        }
    }

    fn paint(&mut self, frame: &mut FrameBuffer) {
        self.cursor = view::render(&mut self.editor, &self.theme, frame);
    }

    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        self.cursor
    }
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let log_file = args
        .log_file
        .clone()
        .or_else(|| std::env::var_os(LOG_ENV).map(PathBuf::from));
    if let Some(path) = &log_file {
        setup_tracing(path, args.verbose)?;
    }

    let theme = builtin_theme(THEME_NAME).ok_or_else(|| format!("missing theme {THEME_NAME}"))?;
    let mut app = Vimlet::new(&args, theme);

    let mut event_loop = EventLoop::new()?;
    tracing::info!(file = ?args.file, lang = %app.editor.language(), "starting");
    event_loop.run(&mut app)?;
    tracing::info!("exiting");
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use vl_editor::editor::MessageKind;
    use vl_term::input::{KeyCode, KeyEvent};

    fn app(argv: &[&str]) -> Vimlet {
        let args = Args::try_parse_from(argv).unwrap();
        Vimlet::new(&args, builtin_theme(THEME_NAME).unwrap())
    }

    fn key(app: &mut Vimlet, key: KeyEvent) -> Action {
        app.on_event(&Event::Key(key))
    }

    fn typed(app: &mut Vimlet, text: &str) -> Action {
        text.chars()
            .map(|ch| key(app, KeyEvent::char(ch)))
            .last()
            .unwrap_or(Action::Continue)
    }

    #[test]
    fn parses_all_flags() {
        let args =
            Args::try_parse_from(["vimlet", "a.c", "-l", "c", "--log-file", "x.log", "-v"]).unwrap();
        assert_eq!(args.file, Some(PathBuf::from("a.c")));
        assert_eq!(args.lang, "c");
        assert_eq!(args.log_file, Some(PathBuf::from("x.log")));
        assert!(args.verbose);
    }

    #[test]
    fn language_defaults_to_python() {
        let args = Args::try_parse_from(["vimlet"]).unwrap();
        assert_eq!(args.lang, "python");
        assert_eq!(args.file, None);
    }

    #[test]
    fn lang_flag_switches_language() {
        let app = app(&["vimlet", "--lang", "JavaScript"]);
        assert_eq!(app.editor.language(), "javascript");
    }

    #[test]
    fn unknown_lang_falls_back() {
        let app = app(&["vimlet", "-l", "cobol"]);
        assert_eq!(app.editor.language(), "python");
        assert_eq!(app.editor.message().map(|m| m.kind), Some(MessageKind::Error));
    }

    #[test]
    fn opens_file_argument() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.py");
        std::fs::write(&path, "print('hi')\n").unwrap();
        let app = app(&["vimlet", path.to_str().unwrap()]);
        assert_eq!(app.editor.host().buffer().contents(), "print('hi')\n");
    }

    #[test]
    fn unreadable_file_argument_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&["vimlet", dir.path().to_str().unwrap()]);
        assert_eq!(app.editor.host().buffer().contents(), "");
        assert_eq!(app.editor.path(), None);
        assert_eq!(app.editor.message().map(|m| m.kind), Some(MessageKind::Error));
    }

    #[test]
    fn quit_command_stops_loop() {
        let mut app = app(&["vimlet"]);
        assert_eq!(typed(&mut app, ":q"), Action::Continue);
        assert_eq!(key(&mut app, KeyEvent::new(KeyCode::Enter)), Action::Quit);
    }

    #[test]
    fn paste_event_reaches_editor() {
        let mut app = app(&["vimlet"]);
        typed(&mut app, "i");
        app.on_event(&Event::Paste("x = 1".into()));
        assert_eq!(app.editor.host().buffer().contents(), "x = 1");
    }

    #[test]
    fn paint_reports_cursor() {
        let mut app = app(&["vimlet"]);
        let mut frame = FrameBuffer::new(40, 6);
        app.paint(&mut frame);
        assert_eq!(app.cursor(), Some((0, 0, CursorShape::SteadyBar)));
    }
}
