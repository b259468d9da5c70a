// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, window size, and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and raw fd writes. These are
// the standard POSIX interfaces for terminal control — there is no safe
// alternative. Each unsafe block is minimal and documented.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state. Raw mode here is the editor
// flavor: VMIN=0, VTIME=1, so a `read()` on stdin returns after at most
// 100ms with no data. That bounded timeout is the editor's only suspension
// point — it resolves the ESC-vs-escape-sequence ambiguity in the input
// decoder and drives periodic re-render (message bar expiry) while idle.
//
// Cleanup is guaranteed on drop and on panic. The panic hook bypasses
// Rust's stdout lock entirely, writing a pre-built restore sequence
// directly to fd 1 — if the panic fired mid-frame while the lock was
// held, going through `io::stdout()` would deadlock.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal or the query fails.
#[cfg(unix)]
#[must_use]
pub fn ioctl_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn ioctl_size() -> Option<Size> {
    None
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

/// Fallback size query for terminals where the ioctl fails.
///
/// Parks the cursor at the bottom-right corner (CUF/CUD clamp at the
/// screen edge) and asks for a cursor position report. The terminal
/// answers `ESC [ rows ; cols R` on stdin; parsing that gives the size.
/// Only valid in raw mode — the reply must not be echoed or line-buffered.
fn fallback_size() -> Option<Size> {
    let mut stdout = io::stdout().lock();
    ansi::cursor_to_bottom_right(&mut stdout).ok()?;
    ansi::query_cursor_position(&mut stdout).ok()?;
    stdout.flush().ok()?;
    drop(stdout);

    read_cursor_report()
}

/// Read and parse a cursor position report (`ESC [ rows ; cols R`).
///
/// Reads stdin byte-by-byte under the raw-mode timeout; gives up on the
/// first timeout or after a bounded number of bytes.
#[cfg(unix)]
fn read_cursor_report() -> Option<Size> {
    let mut reply = [0u8; 32];
    let mut len = 0;

    while len < reply.len() {
        let mut b: u8 = 0;
        let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut b).cast(), 1) };
        if n != 1 {
            break;
        }
        reply[len] = b;
        len += 1;
        if b == b'R' {
            break;
        }
    }

    parse_cursor_report(&reply[..len])
}

#[cfg(not(unix))]
fn read_cursor_report() -> Option<Size> {
    None
}

/// Parse `ESC [ rows ; cols R` into a [`Size`].
fn parse_cursor_report(reply: &[u8]) -> Option<Size> {
    let body = reply.strip_prefix(b"\x1b[")?.strip_suffix(b"R")?;
    let text = std::str::from_utf8(body).ok()?;
    let (rows, cols) = text.split_once(';')?;
    Some(Size {
        rows: rows.parse().ok()?,
        cols: cols.parse().ok()?,
    })
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of original termios for panic recovery.
///
/// The [`Terminal`] struct owns its own copy, but the panic hook can't
/// access it. This global backup — behind a [`Mutex`], not `static mut` —
/// lets the hook restore cooked mode without the struct.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
            }
        }
    }
}

/// Screen restore sequence for emergency use: reset SGR attributes,
/// clear the screen, home the cursor, show the cursor.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[0m\x1b[2J\x1b[H\x1b[?25h";

/// Panic hook guard — ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// Without this, a panic in raw mode leaves the user's terminal broken:
/// no echo, no line editing, no way to read the error message. The hook
/// writes [`EMERGENCY_RESTORE`] directly to fd 1 (bypassing Rust's stdout
/// lock to avoid deadlock), restores termios, then delegates to the
/// original panic handler so the error prints to a working terminal.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the screen restore sequence directly to stdout's file descriptor.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle with RAII cleanup.
///
/// Call [`enter`](Self::enter) to switch to raw mode. The terminal is
/// automatically restored (screen cleared, cursor shown, cooked mode)
/// when the handle is dropped — even on panic.
pub struct Terminal {
    /// Original termios saved before entering raw mode.
    #[cfg(unix)]
    original_termios: Option<libc::termios>,

    /// Current terminal size (cached, refresh with [`refresh_size`](Self::refresh_size)).
    size: Size,

    /// Whether raw mode is active.
    active: bool,
}

impl Terminal {
    /// Create a terminal handle and query the current size.
    ///
    /// Does **not** enter raw mode — call [`enter`](Self::enter) for that.
    /// Falls back to 80×24 if the size cannot be determined at all (e.g.,
    /// in tests or piped environments).
    ///
    /// # Errors
    ///
    /// Currently infallible; returns `Result` so callers treat terminal
    /// setup uniformly with `enter`.
    pub fn new() -> io::Result<Self> {
        let size = ioctl_size().unwrap_or(Size { cols: 80, rows: 24 });

        Ok(Self {
            #[cfg(unix)]
            original_termios: None,
            size,
            active: false,
        })
    }

    /// Current terminal size (columns, rows).
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query the terminal size.
    ///
    /// Prefers `ioctl(TIOCGWINSZ)`; when that fails and raw mode is
    /// active, falls back to the cursor-report probe. Returns the
    /// updated size and caches it internally.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(s) = ioctl_size() {
            self.size = s;
        } else if self.active && is_tty() {
            if let Some(s) = fallback_size() {
                self.size = s;
            }
        }
        self.size
    }

    /// Whether raw mode is currently active.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enter raw mode.
    ///
    /// Disables echo, canonical mode, signals, and output processing, and
    /// sets VMIN=0 / VTIME=1 so reads time out after 100ms. Installs the
    /// panic hook on first use. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the termios calls fail.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        install_panic_hook();
        self.enable_raw_mode()?;
        self.active = true;

        // Now that raw mode can read the cursor report, retry the size
        // probe if the ioctl path came up empty at construction.
        if is_tty() && ioctl_size().is_none() {
            if let Some(s) = fallback_size() {
                self.size = s;
            }
        }

        Ok(())
    }

    /// Leave raw mode and restore the screen.
    ///
    /// Clears the screen, homes and shows the cursor, and restores the
    /// original termios. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal output or termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::reset(&mut lock)?;
        ansi::clear_screen(&mut lock)?;
        ansi::cursor_home(&mut lock)?;
        ansi::cursor_show(&mut lock)?;
        lock.flush()?;
        drop(lock);

        self.disable_raw_mode()?;
        self.active = false;
        Ok(())
    }

    // ── Raw Mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        if !is_tty() {
            return Ok(());
        }

        let fd = io::stdin().as_raw_fd();

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            // Save original for restore.
            self.original_termios = Some(termios);

            // Also save to global backup for the panic hook.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            termios.c_iflag &=
                !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN);
            termios.c_cflag |= libc::CS8;

            // VMIN=0, VTIME=1: read() returns after at most 100ms, with
            // 0 bytes on timeout. The editor's sole suspension point.
            termios.c_cc[libc::VMIN] = 0;
            termios.c_cc[libc::VTIME] = 1;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if let Some(ref original) = self.original_termios {
            use std::os::unix::io::AsRawFd;
            let fd = io::stdin().as_raw_fd();

            unsafe {
                if libc::tcsetattr(fd, libc::TCSAFLUSH, original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }

            // Clear the global backup — we've restored successfully.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }

            self.original_termios = None;
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
    use pretty_assertions::assert_eq;

    // ── Cursor report parsing ─────────────────────────────────────────

    #[test]
    fn parse_valid_report() {
        assert_eq!(
            parse_cursor_report(b"\x1b[24;80R"),
            Some(Size { cols: 80, rows: 24 })
        );
    }

    #[test]
    fn parse_large_report() {
        assert_eq!(
            parse_cursor_report(b"\x1b[208;432R"),
            Some(Size { cols: 432, rows: 208 })
        );
    }

    #[test]
    fn parse_rejects_missing_prefix() {
        assert_eq!(parse_cursor_report(b"24;80R"), None);
    }

    #[test]
    fn parse_rejects_missing_terminator() {
        assert_eq!(parse_cursor_report(b"\x1b[24;80"), None);
    }

    #[test]
    fn parse_rejects_missing_semicolon() {
        assert_eq!(parse_cursor_report(b"\x1b[2480R"), None);
    }

    #[test]
    fn parse_rejects_garbage_numbers() {
        assert_eq!(parse_cursor_report(b"\x1b[a;bR"), None);
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(parse_cursor_report(b""), None);
    }

    // ── Emergency restore sequence ──────────────────────────────────

    #[test]
    fn emergency_restore_is_valid_utf8() {
        std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
    }

    #[test]
    fn emergency_restore_contains_all_sequences() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.contains("\x1b[0m"), "must reset SGR attributes");
        assert!(s.contains("\x1b[2J"), "must clear the screen");
        assert!(s.contains("\x1b[H"), "must home the cursor");
        assert!(s.contains("\x1b[?25h"), "must show the cursor");
    }

    // ── Terminal struct ─────────────────────────────────────────────

    #[test]
    fn terminal_new_succeeds() {
        let term = Terminal::new().unwrap();
        assert!(!term.is_active());
    }

    #[test]
    fn terminal_has_reasonable_default_size() {
        let term = Terminal::new().unwrap();
        let s = term.size();
        assert!(s.cols > 0);
        assert!(s.rows > 0);
    }

    #[test]
    fn terminal_enter_leave_cycle() {
        let mut term = Terminal::new().unwrap();
        term.enter().unwrap();
        assert!(term.is_active());
        term.leave().unwrap();
        assert!(!term.is_active());
    }

    #[test]
    fn terminal_double_enter_is_idempotent() {
        let mut term = Terminal::new().unwrap();
        term.enter().unwrap();
        term.enter().unwrap();
        assert!(term.is_active());
        term.leave().unwrap();
    }

    #[test]
    fn terminal_leave_without_enter() {
        let mut term = Terminal::new().unwrap();
        term.leave().unwrap();
        assert!(!term.is_active());
    }

    #[test]
    fn terminal_drop_without_enter() {
        let term = Terminal::new().unwrap();
        drop(term);
    }

    #[test]
    fn ioctl_size_does_not_panic() {
        let _ = ioctl_size();
    }

    #[test]
    fn is_tty_does_not_panic() {
        let _ = is_tty();
    }
}
