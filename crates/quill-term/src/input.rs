// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Terminal input decoding.
//
// Turns raw stdin bytes into logical [`Key`] events. Two layers:
//
//   decode_byte — pure: first byte + a bounded byte source → Key.
//     Testable without a terminal; the byte source is any closure.
//
//   read_key — the fd-reading shell. One `read()` on stdin with the
//     raw-mode idle timeout (VMIN=0, VTIME=1 → 100ms). No data is
//     `Ok(None)`, not an error — the caller's loop treats it as a
//     tick and re-renders.
//
// # Escape sequences
//
// A leading ESC triggers a bounded lookahead of at most three more
// bytes (`ESC [ digit ~` is the longest sequence we decode). Each
// lookahead read is bounded by the same idle timeout, so an
// incomplete sequence degrades to a literal `Escape` rather than
// blocking — pressing the Escape key alone costs at most one timeout.

use std::io;

// ─── Key ────────────────────────────────────────────────────────────────────

/// A decoded logical key event.
///
/// Control chords that alias navigation keys (Ctrl-W/A/S/D) are resolved
/// to the arrow variants here, so downstream handling never distinguishes
/// the two input styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character (including tab).
    Char(char),
    /// A control chord, identified by its lowercase letter (Ctrl-Q → `'q'`).
    Ctrl(char),
    Enter,
    Backspace,
    Escape,
    Delete,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

/// Control-chord aliases for the arrow keys.
///
/// Ctrl-W/A/S/D mirror Up/Left/Down/Right so the navigation cluster works
/// without leaving the home row. Resolved at decode time: the editor sees
/// the same [`Key`] either way.
fn ctrl_alias(letter: char) -> Key {
    match letter {
        'w' => Key::Up,
        'a' => Key::Left,
        's' => Key::Down,
        'd' => Key::Right,
        _ => Key::Ctrl(letter),
    }
}

// ─── Pure decoding ──────────────────────────────────────────────────────────

/// Decode one key event from a first byte plus a bounded byte source.
///
/// `next` supplies lookahead bytes for escape sequences; returning `None`
/// means no byte arrived within the idle timeout. Returns `None` for bytes
/// that produce no event (invalid UTF-8 fragments, unknown controls).
pub fn decode_byte(first: u8, mut next: impl FnMut() -> Option<u8>) -> Option<Key> {
    match first {
        0x1b => Some(decode_escape(&mut next)),
        b'\r' | b'\n' => Some(Key::Enter),
        0x7f | 0x08 => Some(Key::Backspace),
        b'\t' => Some(Key::Char('\t')),
        // Control chords: byte AND 0x1F of the letter.
        b @ 0x01..=0x1a => Some(ctrl_alias((b + b'a' - 1) as char)),
        b @ 0x20..=0x7e => Some(Key::Char(b as char)),
        b @ 0xc0..=0xff => decode_utf8(b, &mut next),
        // NUL and bare continuation bytes produce nothing.
        _ => None,
    }
}

/// Decode the remainder of an escape sequence after a leading ESC.
///
/// Lookahead is bounded: at most three further bytes, each gated by the
/// read timeout. Any unrecognized or incomplete sequence is a literal
/// [`Key::Escape`].
fn decode_escape(next: &mut impl FnMut() -> Option<u8>) -> Key {
    let Some(b1) = next() else {
        return Key::Escape;
    };

    match b1 {
        b'[' => {
            let Some(b2) = next() else {
                return Key::Escape;
            };
            match b2 {
                // ESC [ digit ~ — editing/paging keys by digit value.
                b'0'..=b'9' => match next() {
                    Some(b'~') => match b2 {
                        b'1' | b'7' => Key::Home,
                        b'3' => Key::Delete,
                        b'4' | b'8' => Key::End,
                        b'5' => Key::PageUp,
                        b'6' => Key::PageDown,
                        _ => Key::Escape,
                    },
                    _ => Key::Escape,
                },
                b'A' => Key::Up,
                b'B' => Key::Down,
                b'C' => Key::Right,
                b'D' => Key::Left,
                b'F' => Key::End,
                b'H' => Key::Home,
                _ => Key::Escape,
            }
        }
        // SS3 variants some terminals send for Home/End.
        b'O' => match next() {
            Some(b'H') => Key::Home,
            Some(b'F') => Key::End,
            _ => Key::Escape,
        },
        _ => Key::Escape,
    }
}

/// Decode a UTF-8 multi-byte character given its lead byte.
///
/// Pulls the continuation bytes from `next`. Malformed or truncated
/// sequences decode to `None` (the bytes are dropped, not re-queued —
/// in practice a keypress delivers its bytes together).
fn decode_utf8(lead: u8, next: &mut impl FnMut() -> Option<u8>) -> Option<Key> {
    let len = match lead {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return None,
    };

    let mut bytes = [lead, 0, 0, 0];
    for slot in bytes.iter_mut().take(len).skip(1) {
        let b = next()?;
        if b & 0xc0 != 0x80 {
            return None;
        }
        *slot = b;
    }

    std::str::from_utf8(&bytes[..len])
        .ok()
        .and_then(|s| s.chars().next())
        .map(Key::Char)
}

// ─── Reading shell ──────────────────────────────────────────────────────────

/// Read one byte from stdin, honoring the raw-mode idle timeout.
///
/// Returns `Ok(None)` when the timeout expired with no data (VMIN=0
/// makes `read()` return 0 in that case). `EINTR`/`EAGAIN` are folded
/// into the no-data result; anything else is a real error.
#[cfg(unix)]
fn read_byte() -> io::Result<Option<u8>> {
    let mut b: u8 = 0;
    let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut b).cast(), 1) };
    match n {
        1 => Ok(Some(b)),
        0 => Ok(None),
        _ => {
            let err = io::Error::last_os_error();
            match err.raw_os_error() {
                Some(libc::EAGAIN | libc::EINTR) => Ok(None),
                _ => Err(err),
            }
        }
    }
}

#[cfg(not(unix))]
fn read_byte() -> io::Result<Option<u8>> {
    use std::io::Read;
    let mut b = [0u8; 1];
    match io::stdin().read(&mut b)? {
        0 => Ok(None),
        _ => Ok(Some(b[0])),
    }
}

/// Block for up to one idle timeout and decode a single key event.
///
/// `Ok(None)` means nothing arrived (or the byte decoded to nothing);
/// the caller retries on its next loop iteration.
///
/// # Errors
///
/// Returns an error only for a genuine `read()` failure on stdin.
pub fn read_key() -> io::Result<Option<Key>> {
    let Some(first) = read_byte()? else {
        return Ok(None);
    };
    // Lookahead reads share the idle timeout; errors inside the
    // closure degrade to "no byte", which decodes as a literal ESC.
    Ok(decode_byte(first, || read_byte().ok().flatten()))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
