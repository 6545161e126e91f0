// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, alternate screen, and cleanup.
//
// Raw mode goes through termios directly (tcgetattr/tcsetattr) and the
// window size through ioctl(TIOCGWINSZ). These are the POSIX interfaces;
// each unsafe block wraps exactly one call.
//
// Cleanup happens three ways: `leave()`, `Drop`, and a panic hook that
// writes a canned restore sequence straight to fd 1. The hook bypasses the
// stdout lock so a panic in the middle of a frame cannot deadlock.
#![allow(unsafe_code)]

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

/// Fallback when stdout is not a terminal (tests, pipes).
const FALLBACK_SIZE: Size = Size { cols: 80, rows: 24 };

/// Query the window size. `None` if stdout is not a terminal.
#[cfg(unix)]
#[must_use]
pub fn query_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };
    (rc == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn query_size() -> Option<Size> {
    None
}

/// Whether stdin is a TTY.
#[cfg(unix)]
#[must_use]
pub fn stdin_is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn stdin_is_tty() -> bool {
    false
}

// ─── Panic restore ──────────────────────────────────────────────────────────

/// Copy of the original termios for the panic hook, which cannot reach the
/// `Terminal` that owns the real one.
#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

/// End sync, disable paste, reset SGR and cursor, leave the alt screen.
/// The alt screen exit is last so the shell comes back clean.
#[rustfmt::skip]
const RESTORE_SEQUENCE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[?2004l\
    \x1b[0m\
    \x1b[0 q\
    \x1b[?25h\
    \x1b[?1049l";

static PANIC_HOOK: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            write_restore_sequence();
            #[cfg(unix)]
            if let Ok(guard) = SAVED_TERMIOS.lock() {
                if let Some(original) = guard.as_ref() {
                    unsafe {
                        libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
                    }
                }
            }
            previous(info);
        }));
    });
}

fn write_restore_sequence() {
    #[cfg(unix)]
    unsafe {
        libc::write(
            libc::STDOUT_FILENO,
            RESTORE_SEQUENCE.as_ptr().cast::<libc::c_void>(),
            RESTORE_SEQUENCE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let mut out = io::stdout();
        let _ = out.write_all(RESTORE_SEQUENCE);
        let _ = out.flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Owns the terminal's raw state while the editor runs.
///
/// [`enter`](Self::enter) switches to raw mode and the alternate screen;
/// [`leave`](Self::leave) (or dropping the handle) undoes it.
pub struct Terminal {
    #[cfg(unix)]
    original: Option<libc::termios>,
    size: Size,
    active: bool,
}

impl Terminal {
    /// Create a handle without touching terminal state.
    ///
    /// # Errors
    ///
    /// Infallible today; kept fallible for non-unix backends.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            original: None,
            size: query_size().unwrap_or(FALLBACK_SIZE),
            active: false,
        })
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-read the window size after a resize notification.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(size) = query_size() {
            self.size = size;
        }
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enter raw mode and the alternate screen. Idempotent.
    ///
    /// # Errors
    ///
    /// Fails if termios or the initial writes fail.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook();
        self.enable_raw_mode()?;

        let mut out = io::stdout().lock();
        ansi::enter_alt_screen(&mut out)?;
        ansi::cursor_hide(&mut out)?;
        ansi::clear_screen(&mut out)?;
        ansi::enable_bracketed_paste(&mut out)?;
        out.flush()?;

        self.active = true;
        tracing::debug!(cols = self.size.cols, rows = self.size.rows, "terminal entered");
        Ok(())
    }

    /// Restore the terminal. Idempotent.
    ///
    /// # Errors
    ///
    /// Fails if the restore writes or termios fail.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        let mut out = io::stdout().lock();
        ansi::end_sync(&mut out)?;
        ansi::disable_bracketed_paste(&mut out)?;
        ansi::reset(&mut out)?;
        ansi::set_cursor_shape(&mut out, ansi::CursorShape::Default)?;
        ansi::cursor_show(&mut out)?;
        ansi::exit_alt_screen(&mut out)?;
        out.flush()?;
        drop(out);

        self.disable_raw_mode()?;
        self.active = false;
        tracing::debug!("terminal left");
        Ok(())
    }

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if !stdin_is_tty() {
            return Ok(());
        }

        let fd = libc::STDIN_FILENO;
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &raw mut termios) } != 0 {
            return Err(io::Error::last_os_error());
        }

        self.original = Some(termios);
        if let Ok(mut saved) = SAVED_TERMIOS.lock() {
            *saved = Some(termios);
        }

        // cfmakeraw, spelled out.
        termios.c_iflag &= !(libc::IGNBRK
            | libc::BRKINT
            | libc::PARMRK
            | libc::ISTRIP
            | libc::INLCR
            | libc::IGNCR
            | libc::ICRNL
            | libc::IXON);
        termios.c_oflag &= !libc::OPOST;
        termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
        termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
        termios.c_cflag |= libc::CS8;
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;

        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        let Some(original) = self.original.take() else {
            return Ok(());
        };
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const original) } != 0 {
            return Err(io::Error::last_os_error());
        }
        if let Ok(mut saved) = SAVED_TERMIOS.lock() {
            *saved = None;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_sequence_leaves_alt_screen_last() {
        assert!(RESTORE_SEQUENCE.ends_with(b"\x1b[?1049l"));
    }

    #[test]
    fn restore_sequence_shows_cursor() {
        let s = std::str::from_utf8(RESTORE_SEQUENCE).unwrap();
        assert!(s.contains("\x1b[?25h"));
        assert!(s.contains("\x1b[?2004l"));
    }

    #[test]
    fn new_has_nonzero_size() {
        let term = Terminal::new().unwrap();
        assert!(term.size().cols > 0);
        assert!(term.size().rows > 0);
        assert!(!term.is_active());
    }

    #[test]
    fn leave_without_enter_is_noop() {
        let mut term = Terminal::new().unwrap();
        term.leave().unwrap();
        assert!(!term.is_active());
    }

    #[test]
    fn query_size_does_not_panic() {
        let _ = query_size();
        let _ = stdin_is_tty();
    }
}
