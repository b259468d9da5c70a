//! Cursor — position tracking with sticky-column vertical movement.
//!
//! The cursor is a `(cx, cy)` pair of char-column and row index. `cy` may
//! equal the row count (the position below the last row — where typing
//! appends) and `cx` may equal the current row's length (past the last
//! character). The render column `rx` is always derived from `(cx, cy)`
//! through the row's tab-expansion mapping, never stored here.
//!
//! # Sticky column
//!
//! Vertical movement remembers the furthest column reached: moving down
//! through a short line and back up restores the original column.
//! Horizontal movement and edits reset the memory to the actual column.

use crate::document::Document;

/// A cursor in a document.
///
/// Lightweight value type — a position and a sticky column. Does not own
/// or reference the document; movement methods take it as a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Char column in the current row (may equal the row length).
    pub cx: usize,
    /// Row index (may equal the row count).
    pub cy: usize,
    /// Remembered column for vertical movement.
    sticky: usize,
}

impl Cursor {
    /// A cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cx: 0,
            cy: 0,
            sticky: 0,
        }
    }

    /// Length of the row under the cursor (0 below the last row).
    #[must_use]
    pub fn row_len(&self, doc: &Document) -> usize {
        doc.row(self.cy).map_or(0, crate::row::Row::len)
    }

    /// Place the cursor at an exact position, resetting the sticky column.
    pub const fn jump(&mut self, cy: usize, cx: usize) {
        self.cy = cy;
        self.cx = cx;
        self.sticky = cx;
    }

    // -- Horizontal ---------------------------------------------------------

    /// Move one step left; at column 0 wraps to the end of the previous row.
    pub fn move_left(&mut self, doc: &Document) {
        if self.cx > 0 {
            self.cx -= 1;
        } else if self.cy > 0 {
            self.cy -= 1;
            self.cx = self.row_len(doc);
        }
        self.sticky = self.cx;
    }

    /// Move one step right; at the row end wraps to column 0 of the next row.
    pub fn move_right(&mut self, doc: &Document) {
        let len = self.row_len(doc);
        if self.cx < len {
            self.cx += 1;
        } else if self.cy < doc.len() {
            self.cy += 1;
            self.cx = 0;
        }
        self.sticky = self.cx;
    }

    /// Jump to column 0 (Home).
    pub const fn move_home(&mut self) {
        self.cx = 0;
        self.sticky = 0;
    }

    /// Jump past the last character (End). Explicitly clamped — a
    /// zero-length row leaves the cursor at column 0.
    pub fn move_end(&mut self, doc: &Document) {
        self.cx = self.row_len(doc);
        self.sticky = self.cx;
    }

    // -- Vertical -----------------------------------------------------------

    /// Move one row up, restoring the sticky column where possible.
    pub fn move_up(&mut self, doc: &Document) {
        if self.cy > 0 {
            self.cy -= 1;
            self.snap_to_row(doc);
        }
    }

    /// Move one row down (at most to the line below the last row),
    /// restoring the sticky column where possible.
    pub fn move_down(&mut self, doc: &Document) {
        if self.cy < doc.len() {
            self.cy += 1;
            self.snap_to_row(doc);
        }
    }

    /// Clamp `cx` into the current row after a vertical move, preferring
    /// the sticky column.
    fn snap_to_row(&mut self, doc: &Document) {
        self.cx = self.sticky.min(self.row_len(doc));
    }

    /// Re-clamp after an external jump or edit that may have shortened the
    /// row (keeps `cx <= row_len`).
    pub fn clamp(&mut self, doc: &Document) {
        self.cy = self.cy.min(doc.len());
        self.cx = self.cx.min(self.row_len(doc));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(lines: &[&str]) -> Document {
        let mut d = Document::new();
        for (i, line) in lines.iter().enumerate() {
            d.insert_row(i, *line);
        }
        d
    }

    #[test]
    fn down_twice_reaches_third_row() {
        let d = doc(&["abc", "def", "ghi"]);
        let mut c = Cursor::new();
        c.move_down(&d);
        c.move_down(&d);
        assert_eq!(c.cy, 2);
    }

    #[test]
    fn down_stops_below_last_row() {
        let d = doc(&["abc"]);
        let mut c = Cursor::new();
        c.move_down(&d);
        assert_eq!(c.cy, 1);
        c.move_down(&d);
        assert_eq!(c.cy, 1);
        assert_eq!(c.cx, 0);
    }

    #[test]
    fn up_at_top_is_noop() {
        let d = doc(&["abc"]);
        let mut c = Cursor::new();
        c.move_up(&d);
        assert_eq!((c.cx, c.cy), (0, 0));
    }

    #[test]
    fn left_wraps_to_previous_row_end() {
        let d = doc(&["abc", "de"]);
        let mut c = Cursor::new();
        c.jump(1, 0);
        c.move_left(&d);
        assert_eq!((c.cy, c.cx), (0, 3));
    }

    #[test]
    fn right_wraps_to_next_row_start() {
        let d = doc(&["abc", "de"]);
        let mut c = Cursor::new();
        c.jump(0, 3);
        c.move_right(&d);
        assert_eq!((c.cy, c.cx), (1, 0));
    }

    #[test]
    fn right_at_document_end_is_noop() {
        let d = doc(&["ab"]);
        let mut c = Cursor::new();
        c.jump(1, 0); // below last row
        c.move_right(&d);
        assert_eq!((c.cy, c.cx), (1, 0));
    }

    #[test]
    fn sticky_column_restores_across_short_line() {
        let d = doc(&["a long line", "xy", "another long"]);
        let mut c = Cursor::new();
        c.jump(0, 8);
        c.move_down(&d);
        assert_eq!((c.cy, c.cx), (1, 2)); // clamped to short row
        c.move_down(&d);
        assert_eq!((c.cy, c.cx), (2, 8)); // restored
    }

    #[test]
    fn horizontal_move_resets_sticky() {
        let d = doc(&["abcdef", "x", "abcdef"]);
        let mut c = Cursor::new();
        c.jump(0, 5);
        c.move_down(&d); // clamp to 1
        c.move_left(&d); // sticky now 0
        c.move_down(&d);
        assert_eq!((c.cy, c.cx), (2, 0));
    }

    #[test]
    fn end_on_empty_row_stays_at_zero() {
        let d = doc(&[""]);
        let mut c = Cursor::new();
        c.move_end(&d);
        assert_eq!(c.cx, 0);
    }

    #[test]
    fn end_then_up_keeps_sticky_at_line_end() {
        let d = doc(&["abcdef", "abc"]);
        let mut c = Cursor::new();
        c.jump(1, 0);
        c.move_end(&d);
        assert_eq!(c.cx, 3);
        c.move_up(&d);
        assert_eq!((c.cy, c.cx), (0, 3));
    }

    #[test]
    fn clamp_after_row_shrinks() {
        let mut d = doc(&["abcdef"]);
        let mut c = Cursor::new();
        c.jump(0, 6);
        d.delete_char(0, 5);
        c.clamp(&d);
        assert_eq!(c.cx, 5);
    }
}
