//! View — the viewport compositor.
//!
//! Builds one complete screen frame from the document, cursor, and status
//! state, into a `quill-term` [`OutputBuffer`]:
//!
//! - **Scroll clamping** — offsets follow the cursor before anything is
//!   drawn, so the cursor cell is always inside the visible window
//! - **Row slices** — each visible row's render form, windowed to the
//!   display columns `[col_off, col_off + cols)`
//! - **Color runs** — SGR codes are emitted only where the highlight
//!   classification changes between adjacent characters, and every row
//!   ends back on the default foreground
//! - **Bars** — an inverse-video status line and a transient message line
//!
//! The frame is composed in full (cursor hide, home, rows, bars, cursor
//! reposition, cursor show) and handed back in the accumulation buffer;
//! the caller flushes it in a single write.

use std::io;
use std::time::{Duration, Instant};

use unicode_width::UnicodeWidthChar;

use quill_term::ansi;
use quill_term::output::OutputBuffer;
use quill_term::terminal::Size;

use crate::cursor::Cursor;
use crate::document::Document;
use crate::row::Row;
use crate::syntax::Highlight;

/// Version string shown in the welcome banner.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How long a status message stays visible after being set.
pub const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// StatusMessage
// ---------------------------------------------------------------------------

/// A transient message for the bottom bar.
///
/// Expires [`MESSAGE_TIMEOUT`] after it was last set; the idle-timeout
/// re-render loop picks the expiry up without any keypress.
#[derive(Debug, Default)]
pub struct StatusMessage {
    text: String,
    set_at: Option<Instant>,
}

impl StatusMessage {
    /// An empty (expired) message.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            text: String::new(),
            set_at: None,
        }
    }

    /// Set the message and restart the expiry clock.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.set_at = Some(Instant::now());
    }

    /// The message text, or `None` once expired.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self.set_at {
            Some(at) if at.elapsed() < MESSAGE_TIMEOUT => Some(&self.text),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// The visible window into the document: scroll offsets plus extents.
///
/// `rows`/`cols` are the text area; the status and message bars take two
/// further screen rows below it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Viewport {
    /// First visible row index.
    pub row_off: usize,
    /// First visible display column.
    pub col_off: usize,
    /// Text rows on screen.
    pub rows: usize,
    /// Display columns on screen.
    pub cols: usize,
}

impl Viewport {
    /// An empty viewport; call [`resize`](Self::resize) before rendering.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            row_off: 0,
            col_off: 0,
            rows: 0,
            cols: 0,
        }
    }

    /// Adopt a terminal size, reserving two rows for the bars.
    pub const fn resize(&mut self, size: Size) {
        self.cols = size.cols as usize;
        self.rows = (size.rows as usize).saturating_sub(2);
    }

    /// Clamp the scroll offsets so the cursor cell is visible.
    ///
    /// Returns the cursor's render column. After this,
    /// `row_off <= cy < row_off + rows` and `col_off <= rx < col_off + cols`
    /// (whenever the extents are non-zero).
    pub fn scroll(&mut self, doc: &Document, cursor: &Cursor) -> usize {
        let rx = doc.row(cursor.cy).map_or(0, |row| row.cx_to_rx(cursor.cx));

        if cursor.cy < self.row_off {
            self.row_off = cursor.cy;
        }
        if self.rows > 0 && cursor.cy >= self.row_off + self.rows {
            self.row_off = cursor.cy - self.rows + 1;
        }
        if rx < self.col_off {
            self.col_off = rx;
        }
        if self.cols > 0 && rx >= self.col_off + self.cols {
            self.col_off = rx - self.cols + 1;
        }

        rx
    }

    /// Compose one full frame into `out`.
    ///
    /// Scrolls first, then emits cursor-hide, cursor-home, the visible
    /// rows, both bars, the cursor reposition, and cursor-show. The caller
    /// flushes the buffer in a single write.
    ///
    /// # Errors
    ///
    /// Propagates writer errors (infallible for [`OutputBuffer`]).
    pub fn render_frame(
        &mut self,
        doc: &Document,
        cursor: &Cursor,
        message: &StatusMessage,
        out: &mut OutputBuffer,
    ) -> io::Result<()> {
        let rx = self.scroll(doc, cursor);

        ansi::cursor_hide(out)?;
        ansi::cursor_home(out)?;

        self.draw_rows(doc, out)?;
        self.draw_status_bar(doc, cursor, out)?;
        self.draw_message_bar(message, out)?;

        #[allow(clippy::cast_possible_truncation)]
        ansi::cursor_to(
            out,
            (rx - self.col_off) as u16,
            (cursor.cy - self.row_off) as u16,
        )?;
        ansi::cursor_show(out)
    }

    // -- Rows ---------------------------------------------------------------

    fn draw_rows(&self, doc: &Document, out: &mut OutputBuffer) -> io::Result<()> {
        for y in 0..self.rows {
            let file_row = self.row_off + y;
            if let Some(row) = doc.row(file_row) {
                self.draw_row(row, out)?;
            } else if doc.is_empty() && y == self.rows / 3 {
                self.draw_welcome(out);
            } else {
                out.push_str("~");
            }

            ansi::clear_line(out)?;
            out.push_str("\r\n");
        }
        Ok(())
    }

    /// Emit one row's visible slice with run-length color grouping.
    fn draw_row(&self, row: &Row, out: &mut OutputBuffer) -> io::Result<()> {
        let mut col = 0; // display column in the full render form
        let mut emitted = 0; // display columns written to the screen
        let mut color: Option<u8> = None; // active SGR code (None = default)

        for (idx, ch) in row.render().chars().enumerate() {
            let w = ch.width().unwrap_or(1);

            // Entirely left of the window.
            if col + w <= self.col_off {
                col += w;
                continue;
            }
            // A wide char straddling the left edge: pad its visible part.
            if col < self.col_off {
                let visible = col + w - self.col_off;
                if color.is_some() {
                    ansi::fg_default(out)?;
                    color = None;
                }
                for _ in 0..visible.min(self.cols - emitted) {
                    out.push_str(" ");
                    emitted += 1;
                }
                col += w;
                continue;
            }
            // Right edge.
            if emitted + w > self.cols {
                break;
            }

            let code = row.hl().get(idx).copied().unwrap_or(Highlight::Normal).sgr_code();
            if code != color {
                match code {
                    Some(c) => ansi::fg(out, c)?,
                    None => ansi::fg_default(out)?,
                }
                color = code;
            }
            out.push_char(ch);
            col += w;
            emitted += w;
        }

        // Terminate the row's color runs.
        if color.is_some() {
            ansi::fg_default(out)?;
        }
        Ok(())
    }

    fn draw_welcome(&self, out: &mut OutputBuffer) {
        let banner = format!("quill editor -- version {VERSION}");
        let banner: String = banner.chars().take(self.cols).collect();
        let padding = (self.cols.saturating_sub(banner.chars().count())) / 2;

        if padding > 0 {
            out.push_str("~");
            for _ in 1..padding {
                out.push_str(" ");
            }
        }
        out.push_str(&banner);
    }

    // -- Bars ---------------------------------------------------------------

    fn draw_status_bar(
        &self,
        doc: &Document,
        cursor: &Cursor,
        out: &mut OutputBuffer,
    ) -> io::Result<()> {
        ansi::inverse(out)?;

        let name = doc
            .filename()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("[No Name]");
        let modified = if doc.is_dirty() { " (modified)" } else { "" };
        let left = format!("{name:.20} - {} lines{modified}", doc.len());
        let right = format!(
            "{} | {}/{}",
            doc.syntax().map_or("no ft", |s| s.name),
            cursor.cy + 1,
            doc.len()
        );

        let left: String = left.chars().take(self.cols).collect();
        let mut len = left.chars().count();
        out.push_str(&left);

        let right_len = right.chars().count();
        while len < self.cols {
            if self.cols - len == right_len {
                out.push_str(&right);
                break;
            }
            out.push_str(" ");
            len += 1;
        }

        ansi::inverse_off(out)?;
        out.push_str("\r\n");
        Ok(())
    }

    fn draw_message_bar(
        &self,
        message: &StatusMessage,
        out: &mut OutputBuffer,
    ) -> io::Result<()> {
        ansi::clear_line(out)?;
        if let Some(text) = message.text() {
            let text: String = text.chars().take(self.cols).collect();
            out.push_str(&text);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
