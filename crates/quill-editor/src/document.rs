//! Document — the ordered row store with file I/O.
//!
//! A `Document` owns a `Vec<Row>` plus the metadata the editor needs:
//! the backing file path, the selected syntax ruleset, and a dirty
//! counter. Every content or structural mutation increments the counter;
//! a successful save resets it to zero. The controller owns the document
//! exclusively — the compositor and highlighter only read it between
//! completed key-handling steps.
//!
//! # File format
//!
//! Plain text, `\n`-delimited. Trailing `\r`/`\n` are stripped on load
//! (each row stores content only). On save, rows are rejoined with a
//! trailing `\n` each and the file is truncated to the exact computed
//! length before writing. This overwrites in place — a crash mid-write
//! can leave a torn file. Stronger durability (write to a temp file,
//! then rename) is a deliberate non-feature here.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::row::Row;
use crate::syntax::{self, Syntax};

/// The ordered sequence of rows plus file metadata and dirty tracking.
pub struct Document {
    rows: Vec<Row>,
    filename: Option<PathBuf>,
    syntax: Option<&'static Syntax>,
    /// Counts content/structural changes since the last save.
    dirty: u64,
}

impl Document {
    // -- Construction -------------------------------------------------------

    /// Create an empty, unnamed document.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: Vec::new(),
            filename: None,
            syntax: None,
            dirty: 0,
        }
    }

    /// Build an unnamed document from in-memory text.
    ///
    /// Splits on line endings (`\n` and `\r\n` both strip cleanly). The
    /// document starts unmodified.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let rows = text.lines().map(|line| Row::new(line, None)).collect();

        Self {
            rows,
            filename: None,
            syntax: None,
            dirty: 0,
        }
    }

    /// Load a document from a file.
    ///
    /// Selects the syntax ruleset by extension and splits the content on
    /// line endings (`\n` and `\r\n` both strip cleanly). The document
    /// starts unmodified.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not UTF-8.
    pub fn open(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        let syntax = syntax::detect(path);
        let rows = text.lines().map(|line| Row::new(line, syntax)).collect();

        Ok(Self {
            rows,
            filename: Some(path.to_path_buf()),
            syntax,
            dirty: 0,
        })
    }

    // -- Access -------------------------------------------------------------

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the document has no rows.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a row by index.
    #[inline]
    #[must_use]
    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    /// All rows in order.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The backing file path, if any.
    #[inline]
    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// The active syntax ruleset, if any.
    #[inline]
    #[must_use]
    pub const fn syntax(&self) -> Option<&'static Syntax> {
        self.syntax
    }

    /// Whether there are unsaved changes.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty != 0
    }

    /// The modification counter (0 = saved state).
    #[inline]
    #[must_use]
    pub const fn dirty(&self) -> u64 {
        self.dirty
    }

    // -- Metadata -----------------------------------------------------------

    /// Name the document (Save As). Re-selects the syntax ruleset from the
    /// new extension and re-highlights every row under it.
    pub fn set_filename(&mut self, path: PathBuf) {
        self.syntax = syntax::detect(&path);
        self.filename = Some(path);
        let syntax = self.syntax;
        for row in &mut self.rows {
            row.rehighlight(syntax);
        }
    }

    // -- Structural mutation ------------------------------------------------

    /// Insert a row at `at` (clamped to `[0, len]`), shifting the rest down.
    pub fn insert_row(&mut self, at: usize, text: impl Into<String>) {
        let at = at.min(self.rows.len());
        self.rows.insert(at, Row::new(text, self.syntax));
        self.dirty += 1;
    }

    /// Remove the row at `at`, shifting the rest up. No-op out of bounds.
    pub fn delete_row(&mut self, at: usize) {
        if at < self.rows.len() {
            self.rows.remove(at);
            self.dirty += 1;
        }
    }

    /// Insert a character at `(cy, cx)`.
    ///
    /// Inserting on the line below the last row (`cy == len`) first
    /// appends an empty row, so typing at the bottom of the file works.
    pub fn insert_char(&mut self, cy: usize, cx: usize, ch: char) {
        if cy == self.rows.len() {
            self.rows.push(Row::new("", self.syntax));
        }
        if let Some(row) = self.rows.get_mut(cy) {
            row.insert_char(cx, ch, self.syntax);
            self.dirty += 1;
        }
    }

    /// Delete the character at `(cy, cx)`. No-op out of bounds.
    pub fn delete_char(&mut self, cy: usize, cx: usize) {
        if let Some(row) = self.rows.get_mut(cy) {
            if cx < row.len() {
                row.delete_char(cx, self.syntax);
                self.dirty += 1;
            }
        }
    }

    /// Split the row at `(cy, cx)` into two rows (Enter).
    ///
    /// At `cx == 0` this inserts an empty row above; otherwise the row is
    /// truncated to `[0, cx)` and a new row takes `[cx, end)`.
    pub fn insert_newline(&mut self, cy: usize, cx: usize) {
        if cy >= self.rows.len() {
            self.rows.push(Row::new("", self.syntax));
            self.dirty += 1;
            return;
        }
        if cx == 0 {
            self.insert_row(cy, "");
            return;
        }
        let syntax = self.syntax;
        let tail = self.rows[cy].split_off(cx, syntax);
        self.rows.insert(cy + 1, tail);
        self.dirty += 1;
    }

    /// Join row `cy` onto the end of row `cy - 1` (Backspace at column 0).
    ///
    /// Returns the length of the previous row before the join — the new
    /// cursor column. No-op (returning `None`) at the document start or
    /// out of bounds.
    pub fn join_with_previous(&mut self, cy: usize) -> Option<usize> {
        if cy == 0 || cy >= self.rows.len() {
            return None;
        }
        let syntax = self.syntax;
        let removed = self.rows.remove(cy);
        let prev = &mut self.rows[cy - 1];
        let join_at = prev.len();
        prev.append_str(removed.raw(), syntax);
        self.dirty += 1;
        Some(join_at)
    }

    // -- Highlight maintenance ---------------------------------------------

    /// Recompute the highlight tags of one row from its ruleset, clearing
    /// any painted match spans.
    pub fn rehighlight_row(&mut self, cy: usize) {
        let syntax = self.syntax;
        if let Some(row) = self.rows.get_mut(cy) {
            row.rehighlight(syntax);
        }
    }

    /// Paint a search-match span on one row (raw char coordinates).
    pub fn highlight_match(&mut self, cy: usize, cx: usize, len: usize) {
        if let Some(row) = self.rows.get_mut(cy) {
            row.highlight_match(cx, len);
        }
    }

    // -- Saving -------------------------------------------------------------

    /// The document serialized for disk: every row followed by `\n`.
    #[must_use]
    pub fn contents(&self) -> String {
        let mut text = String::new();
        for row in &self.rows {
            text.push_str(row.raw());
            text.push('\n');
        }
        text
    }

    /// Write the document to its backing file.
    ///
    /// Truncates the file to the exact serialized length, writes in place,
    /// and resets the dirty counter. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error when there is no filename
    /// (`io::ErrorKind::InvalidInput`) or on any I/O failure; the document
    /// stays dirty in that case.
    pub fn save(&mut self) -> io::Result<usize> {
        let Some(path) = self.filename.clone() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no filename set",
            ));
        };

        let text = self.contents();
        let mut file = OpenOptions::new().write(true).create(true).open(&path)?;
        file.set_len(text.len() as u64)?;
        file.write_all(text.as_bytes())?;
        file.flush()?;

        self.dirty = 0;
        Ok(text.len())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc_from(lines: &[&str]) -> Document {
        let mut doc = Document::new();
        for (i, line) in lines.iter().enumerate() {
            doc.insert_row(i, *line);
        }
        doc
    }

    fn raw_rows(doc: &Document) -> Vec<&str> {
        doc.rows().iter().map(super::Row::raw).collect()
    }

    // -- Construction -------------------------------------------------------

    #[test]
    fn new_document_is_empty_and_clean() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert!(!doc.is_dirty());
        assert!(doc.filename().is_none());
    }

    #[test]
    fn from_text_splits_lines_and_starts_clean() {
        let doc = Document::from_text("abc\ndef\r\nghi\n");
        assert_eq!(raw_rows(&doc), vec!["abc", "def", "ghi"]);
        assert!(!doc.is_dirty());
        assert!(doc.filename().is_none());
    }

    // -- Structural mutation ------------------------------------------------

    #[test]
    fn insert_row_preserves_order() {
        let mut doc = doc_from(&["a", "c"]);
        doc.insert_row(1, "b");
        assert_eq!(raw_rows(&doc), vec!["a", "b", "c"]);
    }

    #[test]
    fn delete_row_shifts_up() {
        let mut doc = doc_from(&["a", "b", "c"]);
        doc.delete_row(1);
        assert_eq!(raw_rows(&doc), vec!["a", "c"]);
    }

    #[test]
    fn delete_row_out_of_bounds_is_noop() {
        let mut doc = doc_from(&["a"]);
        let dirty = doc.dirty();
        doc.delete_row(5);
        assert_eq!(doc.dirty(), dirty);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn every_mutation_bumps_dirty() {
        let mut doc = Document::new();
        doc.insert_row(0, "ab");
        assert_eq!(doc.dirty(), 1);
        doc.insert_char(0, 1, 'x');
        assert_eq!(doc.dirty(), 2);
        doc.delete_char(0, 1);
        assert_eq!(doc.dirty(), 3);
        doc.insert_newline(0, 1);
        assert_eq!(doc.dirty(), 4);
        doc.join_with_previous(1);
        assert_eq!(doc.dirty(), 5);
    }

    #[test]
    fn insert_char_below_last_row_appends() {
        let mut doc = Document::new();
        doc.insert_char(0, 0, 'a');
        assert_eq!(raw_rows(&doc), vec!["a"]);
    }

    #[test]
    fn split_then_join_restores_row() {
        let mut doc = doc_from(&["hello world"]);
        doc.insert_newline(0, 5);
        assert_eq!(raw_rows(&doc), vec!["hello", " world"]);

        let col = doc.join_with_previous(1).unwrap();
        assert_eq!(raw_rows(&doc), vec!["hello world"]);
        assert_eq!(col, 5);
    }

    #[test]
    fn newline_at_column_zero_inserts_empty_row() {
        let mut doc = doc_from(&["abc"]);
        doc.insert_newline(0, 0);
        assert_eq!(raw_rows(&doc), vec!["", "abc"]);
    }

    #[test]
    fn join_at_document_start_is_noop() {
        let mut doc = doc_from(&["abc"]);
        assert_eq!(doc.join_with_previous(0), None);
        assert_eq!(raw_rows(&doc), vec!["abc"]);
    }

    #[test]
    fn join_merges_contents() {
        let mut doc = doc_from(&["abc", "def"]);
        let col = doc.join_with_previous(1).unwrap();
        assert_eq!(raw_rows(&doc), vec!["abcdef"]);
        assert_eq!(col, 3);
    }

    // -- File I/O -----------------------------------------------------------

    #[test]
    fn save_then_reopen_is_identical() {
        let path = std::env::temp_dir().join("quill-doc-roundtrip.txt");
        let mut doc = doc_from(&["alpha", "beta\twith tab", "", "delta"]);
        doc.set_filename(path.clone());
        doc.save().unwrap();
        assert!(!doc.is_dirty());

        let reopened = Document::open(&path).unwrap();
        assert_eq!(raw_rows(&reopened), raw_rows(&doc));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn open_strips_crlf() {
        let path = std::env::temp_dir().join("quill-doc-crlf.txt");
        fs::write(&path, "one\r\ntwo\r\n").unwrap();
        let doc = Document::open(&path).unwrap();
        assert_eq!(raw_rows(&doc), vec!["one", "two"]);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn save_truncates_shrinking_file() {
        let path = std::env::temp_dir().join("quill-doc-truncate.txt");
        fs::write(&path, "a much longer original file content\n").unwrap();

        let mut doc = doc_from(&["tiny"]);
        doc.set_filename(path.clone());
        let written = doc.save().unwrap();
        assert_eq!(written, 5);
        assert_eq!(fs::read_to_string(&path).unwrap(), "tiny\n");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn save_without_filename_fails_and_stays_dirty() {
        let mut doc = doc_from(&["x"]);
        assert!(doc.save().is_err());
        assert!(doc.is_dirty());
    }

    #[test]
    fn contents_joins_with_newlines() {
        let doc = doc_from(&["a", "b"]);
        assert_eq!(doc.contents(), "a\nb\n");
    }

    #[test]
    fn set_filename_selects_syntax() {
        let mut doc = doc_from(&["int x = 42;"]);
        assert!(doc.syntax().is_none());
        doc.set_filename(PathBuf::from("prog.c"));
        assert_eq!(doc.syntax().unwrap().name, "c");
    }
}
