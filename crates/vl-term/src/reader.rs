// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Stdin reader thread.
//
// `read()` on stdin blocks, and the event loop needs to wake on its own for
// the escape timeout and resize checks. So a dedicated thread polls stdin
// and ships raw byte chunks over a channel; the loop waits on the channel
// with `recv_timeout`.
//
// The thread polls with a short timeout and checks a stop flag between
// polls, which lets `stop()` join it without ever leaving it parked in a
// blocking read.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// One read's worth of bytes. A key is a handful, a paste can be large.
const CHUNK_SIZE: usize = 4096;

/// Poll timeout between stop-flag checks, in milliseconds.
const POLL_MS: i32 = 50;

/// Handle to the background stdin reader.
///
/// Dropping the handle stops the thread.
pub struct StdinReader {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl StdinReader {
    /// Start the reader thread.
    ///
    /// The receiver yields non-empty byte chunks and disconnects when stdin
    /// hits EOF or the reader is stopped.
    ///
    /// # Errors
    ///
    /// Fails if the OS refuses to spawn the thread.
    pub fn spawn() -> io::Result<(Self, Receiver<Vec<u8>>)> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("vimlet-stdin".into())
            .spawn(move || read_loop(&tx, &flag))?;

        tracing::debug!("stdin reader started");
        Ok((
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        ))
    }

    /// Ask the thread to exit and wait for it. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("stdin reader panicked");
            }
            tracing::debug!("stdin reader stopped");
        }
    }

    /// Whether the thread is still joinable.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(unix)]
fn read_loop(tx: &Sender<Vec<u8>>, stop: &AtomicBool) {
    let fd = libc::STDIN_FILENO;
    let mut buf = [0u8; CHUNK_SIZE];

    while !stop.load(Ordering::Relaxed) {
        let mut pfd = libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        };
        let ready = unsafe { libc::poll(&raw mut pfd, 1, POLL_MS) };
        if ready <= 0 {
            continue;
        }

        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        let Ok(n) = usize::try_from(n) else { break };
        if n == 0 || tx.send(buf[..n].to_vec()).is_err() {
            break;
        }
    }
}

// Without poll() the thread can sit in read() after stop; good enough.
#[cfg(not(unix))]
fn read_loop(tx: &Sender<Vec<u8>>, stop: &AtomicBool) {
    use std::io::Read;

    let mut stdin = io::stdin();
    let mut buf = [0u8; CHUNK_SIZE];

    while !stop.load(Ordering::Relaxed) {
        match stdin.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
