// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop: stdin bytes in, frames out.
//
// The loop waits on the reader channel with a short timeout. Bytes get
// parsed into events and handed to the app. When the timeout fires with a
// lone ESC pending in the parser, the ESC is flushed as the Escape key;
// the timeout therefore doubles as the escape delay.
//
// Resize arrives as SIGWINCH. The handler only flips an atomic, and the
// loop picks it up on the next iteration.
//
// Frames are repainted only when something happened. Each repaint is a
// full frame wrapped in a synchronized update; editor screens are small
// enough that diffing is not worth the bookkeeping.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::ansi::{self, CursorShape};
use crate::frame::FrameBuffer;
use crate::input::{Event, Parser};
use crate::reader::StdinReader;
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

static RESIZED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn on_sigwinch(_sig: libc::c_int) {
    RESIZED.store(true, Ordering::Relaxed);
}

#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = on_sigwinch as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── App ─────────────────────────────────────────────────────────────────────

/// What the loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// The application side of the loop.
///
/// Per iteration the loop calls [`on_event`](App::on_event) for each input
/// event, [`on_resize`](App::on_resize) if the window changed, then
/// [`paint`](App::paint) and [`cursor`](App::cursor) if anything did.
pub trait App {
    /// Handle one input event. Return [`Action::Quit`] to stop the loop.
    fn on_event(&mut self, event: &Event) -> Action;

    /// The window changed size. The frame is already resized.
    fn on_resize(&mut self, _size: Size) {}

    /// Paint into a cleared frame.
    fn paint(&mut self, frame: &mut FrameBuffer);

    /// Where to show the hardware cursor after painting, and in what
    /// shape. `None` keeps it hidden.
    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        None
    }
}

// ─── LoopConfig ──────────────────────────────────────────────────────────────

/// Loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// How long to wait for input before treating a pending ESC as the
    /// Escape key.
    pub escape_timeout: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            escape_timeout: Duration::from_millis(25),
        }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// Owns the terminal and the input parser for the lifetime of a run.
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    config: LoopConfig,
}

impl EventLoop {
    /// # Errors
    ///
    /// Fails if the terminal handle cannot be created.
    pub fn new() -> io::Result<Self> {
        Self::with_config(LoopConfig::default())
    }

    /// # Errors
    ///
    /// Fails if the terminal handle cannot be created.
    pub fn with_config(config: LoopConfig) -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            parser: Parser::default(),
            config,
        })
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Run until the app returns [`Action::Quit`] or stdin closes.
    ///
    /// The terminal is restored on the way out whether or not the loop
    /// failed.
    ///
    /// # Errors
    ///
    /// Fails on terminal setup, teardown, or output errors.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();

        let result = match StdinReader::spawn() {
            Ok((mut reader, rx)) => {
                let result = self.pump(app, &rx);
                reader.stop();
                result
            }
            Err(err) => Err(err),
        };

        self.terminal.leave()?;
        result
    }

    fn pump(&mut self, app: &mut impl App, rx: &Receiver<Vec<u8>>) -> io::Result<()> {
        let size = self.terminal.size();
        app.on_resize(size);
        let mut frame = FrameBuffer::new(size.cols, size.rows);
        let mut dirty = true;

        loop {
            let events = match rx.recv_timeout(self.config.escape_timeout) {
                Ok(bytes) => self.parser.advance(&bytes),
                Err(RecvTimeoutError::Timeout) if self.parser.has_pending() => self.parser.flush(),
                Err(RecvTimeoutError::Timeout) => Vec::new(),
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("stdin closed, leaving event loop");
                    return Ok(());
                }
            };

            for event in &events {
                if app.on_event(event) == Action::Quit {
                    return Ok(());
                }
                dirty = true;
            }

            if RESIZED.swap(false, Ordering::Relaxed) {
                let size = self.terminal.refresh_size();
                tracing::debug!(cols = size.cols, rows = size.rows, "resized");
                frame.resize(size.cols, size.rows);
                app.on_resize(size);
                dirty = true;
            }

            if dirty {
                frame.clear();
                app.paint(&mut frame);
                let mut out = io::stdout().lock();
                present(&mut out, &frame, app.cursor())?;
                out.flush()?;
                dirty = false;
            }
        }
    }
}

/// Write one frame plus the cursor state inside a synchronized update.
///
/// # Errors
///
/// Propagates write errors from `w`.
pub fn present(
    w: &mut impl Write,
    frame: &FrameBuffer,
    cursor: Option<(u16, u16, CursorShape)>,
) -> io::Result<()> {
    ansi::begin_sync(w)?;
    ansi::cursor_hide(w)?;
    frame.render(w)?;
    if let Some((x, y, shape)) = cursor {
        ansi::cursor_to(w, x, y)?;
        ansi::set_cursor_shape(w, shape)?;
        ansi::cursor_show(w)?;
    }
    ansi::end_sync(w)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Style;

    struct Echo;

    impl App for Echo {
        fn on_event(&mut self, _event: &Event) -> Action {
            Action::Continue
        }

        fn paint(&mut self, frame: &mut FrameBuffer) {
            frame.put_str(0, 0, "hi", Style::default());
        }
    }

    #[test]
    fn default_escape_timeout_is_short() {
        assert!(LoopConfig::default().escape_timeout <= Duration::from_millis(50));
    }

    #[test]
    fn present_hides_cursor_without_position() {
        let mut frame = FrameBuffer::new(4, 1);
        Echo.paint(&mut frame);
        let mut out = Vec::new();
        present(&mut out, &frame, Echo.cursor()).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert!(s.starts_with("\x1b[?2026h"));
        assert!(s.ends_with("\x1b[?2026l"));
        assert!(s.contains("hi"));
        assert!(!s.contains("\x1b[?25h"));
    }

    #[test]
    fn present_places_cursor_with_shape() {
        let frame = FrameBuffer::new(4, 2);
        let mut out = Vec::new();
        present(&mut out, &frame, Some((3, 1, CursorShape::SteadyBar))).unwrap();
        let s = String::from_utf8(out).unwrap();
        let tail = s.rsplit("\x1b[0m").next().unwrap();
        assert_eq!(tail, "\x1b[2;4H\x1b[6 q\x1b[?25h\x1b[?2026l");
    }

    #[test]
    fn resize_flag_swaps_back() {
        RESIZED.store(true, Ordering::Relaxed);
        assert!(RESIZED.swap(false, Ordering::Relaxed));
        assert!(!RESIZED.load(Ordering::Relaxed));
    }

    #[test]
    fn event_loop_has_size() {
        let event_loop = EventLoop::new().unwrap();
        assert!(event_loop.size().cols > 0);
    }
}
