// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key and paste events. Handles:
//
// - ASCII and UTF-8 multi-byte characters
// - C0 control bytes (Ctrl+letter, Enter, Tab, Backspace)
// - Legacy CSI sequences (arrows, editing keys, F5-F12 with modifiers)
// - SS3 sequences (F1-F4 and arrows in application mode)
// - Alt+key (ESC followed by a printable byte)
// - Bracketed paste (text between `CSI 200~` and `CSI 201~`)
//
// Escape sequences can be split across `read()` calls, so the parser keeps
// unconsumed bytes between `advance` calls. A lone ESC is held back until
// `flush` is called after a quiet timeout, at which point it becomes the
// Escape key.

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A parsed input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key press.
    Key(KeyEvent),
    /// Bracketed paste content, delivered as one event.
    Paste(String),
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key press with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// A key press with modifiers.
    #[must_use]
    pub const fn with(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// `Ctrl` + a character.
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self::with(KeyCode::Char(ch), Modifiers::CTRL)
    }

    /// A plain character key.
    #[must_use]
    pub const fn char(ch: char) -> Self {
        Self::new(KeyCode::Char(ch))
    }

    /// The character this key types, if it types one: a `Char` key with no
    /// Ctrl or Alt held.
    #[must_use]
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(ch)
                if !self.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT)
                    && !ch.is_control() =>
            {
                Some(ch)
            }
            _ => None,
        }
    }

    /// True for `Ctrl` + `ch` (case-insensitive).
    #[must_use]
    pub fn is_ctrl(&self, ch: char) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
            && matches!(self.code, KeyCode::Char(c) if c.eq_ignore_ascii_case(&ch))
    }
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A Unicode character.
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// F1 through F12.
    F(u8),
}

bitflags! {
    /// Keyboard modifier flags, in xterm's `param = 1 + bitmask` encoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

const PASTE_START: &[u8] = b"\x1b[200~";
const PASTE_END: &[u8] = b"\x1b[201~";

/// Incremental input parser.
#[derive(Debug, Default)]
pub struct Parser {
    /// Bytes not yet turned into events.
    buf: Vec<u8>,
    /// Inside a bracketed paste.
    in_paste: bool,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and return every complete event.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            let rest = &self.buf[pos..];

            if self.in_paste {
                let Some(end) = find_subsequence(rest, PASTE_END) else {
                    break;
                };
                events.push(Event::Paste(String::from_utf8_lossy(&rest[..end]).into_owned()));
                pos += end + PASTE_END.len();
                self.in_paste = false;
                continue;
            }

            if rest.starts_with(PASTE_START) {
                self.in_paste = true;
                pos += PASTE_START.len();
                continue;
            }
            // A prefix of the paste opener is ambiguous until more bytes come.
            if rest.len() < PASTE_START.len() && rest.len() > 2 && PASTE_START.starts_with(rest) {
                break;
            }

            match parse_one(rest) {
                Parsed::Event(event, used) => {
                    events.push(event);
                    pos += used;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(used) => pos += used,
            }
        }

        self.buf.drain(..pos);
        events
    }

    /// Whether bytes are waiting for more input.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty() && !self.in_paste
    }

    /// Resolve held-back bytes after a quiet period. A lone ESC becomes
    /// the Escape key; anything else is decoded byte by byte.
    pub fn flush(&mut self) -> Vec<Event> {
        if self.in_paste {
            return Vec::new();
        }
        let events = self
            .buf
            .iter()
            .filter_map(|&b| match b {
                0x1B => Some(Event::Key(KeyEvent::new(KeyCode::Escape))),
                other => match control_or_ascii(other) {
                    Parsed::Event(event, _) => Some(event),
                    _ => None,
                },
            })
            .collect();
        self.buf.clear();
        events
    }
}

// ─── Stateless parsing ──────────────────────────────────────────────────────

enum Parsed {
    Event(Event, usize),
    Incomplete,
    Skip(usize),
}

fn parse_one(buf: &[u8]) -> Parsed {
    match buf[0] {
        0x1B => parse_escape(buf),
        0xC0..=0xFF => parse_utf8(buf),
        0x80..=0xBF => Parsed::Skip(1),
        b => control_or_ascii(b),
    }
}

/// Decode a single byte below 0x80 (ESC excluded).
fn control_or_ascii(b: u8) -> Parsed {
    let event = match b {
        0x08 | 0x7F => KeyEvent::new(KeyCode::Backspace),
        0x09 => KeyEvent::new(KeyCode::Tab),
        0x0A | 0x0D => KeyEvent::new(KeyCode::Enter),
        0x00 => KeyEvent::ctrl('@'),
        0x01..=0x1A => KeyEvent::ctrl(char::from(b + b'a' - 1)),
        0x20..=0x7E => KeyEvent::char(char::from(b)),
        _ => return Parsed::Skip(1),
    };
    Parsed::Event(Event::Key(event), 1)
}

fn parse_escape(buf: &[u8]) -> Parsed {
    let Some(&next) = buf.get(1) else {
        return Parsed::Incomplete;
    };

    match next {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Event(
            Event::Key(KeyEvent::with(KeyCode::Escape, Modifiers::ALT)),
            2,
        ),
        0x20..=0x7E => Parsed::Event(
            Event::Key(KeyEvent::with(KeyCode::Char(char::from(next)), Modifiers::ALT)),
            2,
        ),
        _ => Parsed::Event(Event::Key(KeyEvent::new(KeyCode::Escape)), 1),
    }
}

fn parse_csi(buf: &[u8]) -> Parsed {
    // Find the final byte (0x40..=0x7E) after `ESC [`.
    let mut end = 2;
    loop {
        let Some(&b) = buf.get(end) else {
            return Parsed::Incomplete;
        };
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    let used = end + 1;
    let params = parse_params(&buf[2..end]);
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let code = match buf[end] {
        b'~' => match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            15 => KeyCode::F(5),
            17 => KeyCode::F(6),
            18 => KeyCode::F(7),
            19 => KeyCode::F(8),
            20 => KeyCode::F(9),
            21 => KeyCode::F(10),
            23 => KeyCode::F(11),
            24 => KeyCode::F(12),
            _ => return Parsed::Skip(used),
        },
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        b'Z' => {
            return Parsed::Event(
                Event::Key(KeyEvent::with(KeyCode::Tab, Modifiers::SHIFT)),
                used,
            );
        }
        _ => return Parsed::Skip(used),
    };

    Parsed::Event(Event::Key(KeyEvent::with(code, modifiers)), used)
}

fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&b) = buf.get(2) else {
        return Parsed::Incomplete;
    };
    let code = match b {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return Parsed::Skip(3),
    };
    Parsed::Event(Event::Key(KeyEvent::new(code)), 3)
}

fn parse_utf8(buf: &[u8]) -> Parsed {
    let len = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Parsed::Skip(1),
    };
    if buf.len() < len {
        return Parsed::Incomplete;
    }
    match std::str::from_utf8(&buf[..len]).ok().and_then(|s| s.chars().next()) {
        Some(ch) => Parsed::Event(Event::Key(KeyEvent::char(ch)), len),
        None => Parsed::Skip(1),
    }
}

/// Semicolon-separated decimal parameters. Colon sub-parameters are dropped.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &d| acc.saturating_mul(10).saturating_add(u16::from(d - b'0')))
        })
        .collect()
}

/// `1 + bitmask` → flags. 0 and 1 both mean "no modifiers".
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let bits = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(bits as u8)
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
