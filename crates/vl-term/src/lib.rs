// SPDX-License-Identifier: MIT
//
// vl-term: the terminal backend for vimlet.
//
// Raw termios, ANSI output, a cell grid to paint into, and a byte-level
// input parser. No TUI framework sits in between; the editor paints a
// `FrameBuffer` and the event loop turns it into escape sequences.

pub mod ansi;
pub mod color;
pub mod event_loop;
pub mod frame;
pub mod input;
pub mod reader;
pub mod terminal;
