//! Row — one line of the document.
//!
//! A `Row` owns three parallel views of the same line:
//!
//! - `raw` — the characters as stored in the file
//! - `render` — the display form: tabs expanded to spaces up to the next
//!   tab stop, everything else copied through
//! - `hl` — one [`Highlight`] tag per render character
//!
//! # Invariants
//!
//! `render.chars().count() == hl.len()` always. `render` and `hl` are
//! regenerated together, atomically, by every mutation of `raw` — neither
//! is ever patched incrementally or cached across edits. The `cx→rx`
//! mapping derived from `raw` is monotonic non-decreasing.
//!
//! # Coordinates
//!
//! `cx` is a char index into `raw` (it may equal the char count — the
//! "past last character" insert position). `rx` is a display column:
//! tabs advance to the next multiple of [`TAB_STOP`], wide characters
//! advance by their `unicode-width`.

use unicode_width::UnicodeWidthChar;

use crate::syntax::{self, Highlight, Syntax};

/// Display columns per tab stop.
pub const TAB_STOP: usize = 4;

/// Display width of one character at display column `col`.
#[inline]
fn char_width(ch: char, col: usize) -> usize {
    if ch == '\t' {
        TAB_STOP - col % TAB_STOP
    } else {
        ch.width().unwrap_or(1)
    }
}

/// One line of the document: raw content plus derived render form and
/// highlight classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    raw: String,
    render: String,
    hl: Vec<Highlight>,
}

impl Row {
    /// Create a row from raw text, deriving render and highlight forms.
    #[must_use]
    pub fn new(text: impl Into<String>, syntax: Option<&Syntax>) -> Self {
        let mut row = Self {
            raw: text.into(),
            render: String::new(),
            hl: Vec::new(),
        };
        row.update(syntax);
        row
    }

    // -- Access -------------------------------------------------------------

    /// The raw content.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The render form (tabs expanded).
    #[inline]
    #[must_use]
    pub fn render(&self) -> &str {
        &self.render
    }

    /// The per-render-character highlight tags.
    #[inline]
    #[must_use]
    pub fn hl(&self) -> &[Highlight] {
        &self.hl
    }

    /// Number of chars in the raw content.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.chars().count()
    }

    /// Whether the raw content is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    // -- Coordinate mapping -------------------------------------------------

    /// Map a raw char column to its display column.
    ///
    /// Sums the display widths of all chars before `cx`: a tab advances to
    /// the next tab stop, everything else by its `unicode-width`. Monotonic
    /// non-decreasing in `cx`.
    #[must_use]
    pub fn cx_to_rx(&self, cx: usize) -> usize {
        let mut rx = 0;
        for ch in self.raw.chars().take(cx) {
            rx += char_width(ch, rx);
        }
        rx
    }

    /// Map a display column back to the raw char column whose character
    /// covers it. Columns past the end of the row map to the row length.
    #[must_use]
    pub fn rx_to_cx(&self, rx: usize) -> usize {
        let mut cur_rx = 0;
        for (cx, ch) in self.raw.chars().enumerate() {
            cur_rx += char_width(ch, cur_rx);
            if cur_rx > rx {
                return cx;
            }
        }
        self.len()
    }

    // -- Editing ------------------------------------------------------------

    /// Insert a character at char column `at` (clamped to `[0, len]`).
    pub fn insert_char(&mut self, at: usize, ch: char, syntax: Option<&Syntax>) {
        let at = at.min(self.len());
        let byte = self.char_to_byte(at);
        self.raw.insert(byte, ch);
        self.update(syntax);
    }

    /// Delete the character at char column `at`. No-op past the end.
    pub fn delete_char(&mut self, at: usize, syntax: Option<&Syntax>) {
        if at >= self.len() {
            return;
        }
        let byte = self.char_to_byte(at);
        self.raw.remove(byte);
        self.update(syntax);
    }

    /// Split the row at char column `at`, keeping `[0, at)` and returning
    /// a new row owning `[at, end)`.
    #[must_use]
    pub fn split_off(&mut self, at: usize, syntax: Option<&Syntax>) -> Self {
        let byte = self.char_to_byte(at.min(self.len()));
        let tail = self.raw.split_off(byte);
        self.update(syntax);
        Self::new(tail, syntax)
    }

    /// Append another row's raw content to this one.
    pub fn append_str(&mut self, text: &str, syntax: Option<&Syntax>) {
        self.raw.push_str(text);
        self.update(syntax);
    }

    // -- Highlighting -------------------------------------------------------

    /// Recompute render and highlight forms from the raw content.
    ///
    /// The single place both derived forms change — callers never touch
    /// `render` or `hl` directly, so the length invariant cannot drift.
    pub fn update(&mut self, syntax: Option<&Syntax>) {
        self.render = String::with_capacity(self.raw.len());
        let mut col = 0;
        for ch in self.raw.chars() {
            if ch == '\t' {
                let spaces = TAB_STOP - col % TAB_STOP;
                for _ in 0..spaces {
                    self.render.push(' ');
                }
                col += spaces;
            } else {
                self.render.push(ch);
                col += ch.width().unwrap_or(1);
            }
        }
        self.hl = syntax::classify_line(&self.render, syntax);
    }

    /// Recompute only the highlight tags (after a ruleset change).
    pub fn rehighlight(&mut self, syntax: Option<&Syntax>) {
        self.hl = syntax::classify_line(&self.render, syntax);
    }

    /// Paint a search-match span over the highlight tags.
    ///
    /// `cx` and `len` are raw char coordinates; the span is mapped through
    /// tab expansion onto the render form. Must be re-applied after every
    /// [`update`](Self::update) or [`rehighlight`](Self::rehighlight) —
    /// those passes reset every tag.
    pub fn highlight_match(&mut self, cx: usize, len: usize) {
        let n = self.hl.len();
        let start = self.render_index(cx).min(n);
        let end = self.render_index(cx + len).min(n);
        for tag in &mut self.hl[start..end] {
            *tag = Highlight::Match;
        }
    }

    /// Index into `render`/`hl` of the first render char derived from the
    /// raw char at `cx` (tabs map to their run of spaces).
    fn render_index(&self, cx: usize) -> usize {
        let mut idx = 0;
        let mut col = 0;
        for ch in self.raw.chars().take(cx) {
            let w = char_width(ch, col);
            col += w;
            idx += if ch == '\t' { w } else { 1 };
        }
        idx
    }

    /// Byte offset of char index `at` in `raw`.
    fn char_to_byte(&self, at: usize) -> usize {
        self.raw
            .char_indices()
            .nth(at)
            .map_or(self.raw.len(), |(byte, _)| byte)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
