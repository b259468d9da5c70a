// SPDX-License-Identifier: MIT
//
// quill — a small terminal text editor.
//
// This is the main binary that wires together the two crates:
//
//   quill-term   → raw mode, ANSI emission, key decoding, output batching
//   quill-editor → text buffer, cursor, syntax, search, viewport
//
// Everything runs on one thread. Each iteration of the loop blocks in a
// single 100 ms-timeout read, then:
//
//   stdin → decode_byte → process_key → document/cursor mutation
//   render_frame → OutputBuffer → one write to stdout
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text area                    │  ← rows - 2 (managed by Viewport)
//   ├──────────────────────────────┤
//   │ status bar (INVERSE)         │  ← 1 row
//   ├──────────────────────────────┤
//   │ message bar                  │  ← 1 row
//   └──────────────────────────────┘

use std::env;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::process;

use quill_editor::cursor::Cursor;
use quill_editor::document::Document;
use quill_editor::search::{self, MatchSet, SearchState};
use quill_editor::view::{StatusMessage, Viewport};
use quill_editor::word;

use quill_term::input::{self, Key};
use quill_term::output::OutputBuffer;
use quill_term::terminal::Terminal;

// ─── Editor ──────────────────────────────────────────────────────────────────

/// The editor controller: owns the document, cursor, and view state, and
/// dispatches decoded keys to mutations.
///
/// The terminal itself is owned by [`run`](Self::run), not the struct, so
/// every dispatch path can be driven headlessly.
struct Editor {
    doc: Document,
    cursor: Cursor,
    view: Viewport,
    message: StatusMessage,
    out: OutputBuffer,
    quit: bool,
}

impl Editor {
    fn new() -> Self {
        Self {
            doc: Document::new(),
            cursor: Cursor::new(),
            view: Viewport::new(),
            message: StatusMessage::new(),
            out: OutputBuffer::new(),
            quit: false,
        }
    }

    /// Open `path`, or start an empty buffer under that name if it does
    /// not exist yet.
    fn from_file(path: &Path) -> io::Result<Self> {
        let doc = match Document::open(path) {
            Ok(doc) => doc,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let mut doc = Document::new();
                doc.set_filename(path.to_path_buf());
                doc
            }
            Err(e) => return Err(e),
        };
        Ok(Self {
            doc,
            ..Self::new()
        })
    }

    // ── Rendering ───────────────────────────────────────────────────────────

    /// Compose a frame and push it to stdout in one write.
    fn refresh_screen(&mut self) -> io::Result<()> {
        // A failed flush leaves its bytes in the buffer; drop them rather
        // than prepend a stale frame to this one.
        self.out.clear();
        self.view
            .render_frame(&self.doc, &self.cursor, &self.message, &mut self.out)?;
        self.out.flush_stdout()
    }

    // ── Key dispatch ────────────────────────────────────────────────────────

    fn process_key(&mut self, key: Key) -> io::Result<()> {
        match key {
            Key::Ctrl('q') => {
                if !self.doc.is_dirty() || self.confirm_quit()? {
                    self.quit = true;
                }
            }
            Key::Ctrl('o') => self.save()?,
            Key::Ctrl('f') => self.find()?,
            Key::Ctrl('n') => self.word_forward(),
            Key::Ctrl('p') => self.word_backward(),

            Key::Up => self.cursor.move_up(&self.doc),
            Key::Down => self.cursor.move_down(&self.doc),
            Key::Left => self.cursor.move_left(&self.doc),
            Key::Right => self.cursor.move_right(&self.doc),
            Key::Home => self.cursor.move_home(),
            Key::End => self.cursor.move_end(&self.doc),
            Key::PageUp => self.page_up(),
            Key::PageDown => self.page_down(),

            Key::Enter => self.insert_newline(),
            Key::Backspace | Key::Ctrl('h') => self.delete_backward(),
            Key::Delete => self.delete_forward(),
            Key::Char(ch) => self.insert_char(ch),

            // Unbound chords and a bare Escape do nothing.
            Key::Ctrl(_) | Key::Escape => {}
        }
        Ok(())
    }

    // ── Editing ─────────────────────────────────────────────────────────────

    fn insert_char(&mut self, ch: char) {
        self.doc.insert_char(self.cursor.cy, self.cursor.cx, ch);
        self.cursor.jump(self.cursor.cy, self.cursor.cx + 1);
    }

    fn insert_newline(&mut self) {
        self.doc.insert_newline(self.cursor.cy, self.cursor.cx);
        self.cursor.jump(self.cursor.cy + 1, 0);
    }

    /// Backspace: delete left of the cursor, joining onto the previous row
    /// at column zero.
    fn delete_backward(&mut self) {
        let (cy, cx) = (self.cursor.cy, self.cursor.cx);
        if cx > 0 {
            self.doc.delete_char(cy, cx - 1);
            self.cursor.jump(cy, cx - 1);
        } else if let Some(col) = self.doc.join_with_previous(cy) {
            self.cursor.jump(cy - 1, col);
        }
    }

    /// Delete: remove the character under the cursor, joining the next row
    /// up when at end of line.
    fn delete_forward(&mut self) {
        let (cy, cx) = (self.cursor.cy, self.cursor.cx);
        if cx < self.cursor.row_len(&self.doc) {
            self.doc.delete_char(cy, cx);
        } else if cy + 1 < self.doc.len() {
            self.doc.join_with_previous(cy + 1);
        }
    }

    // ── Motion ──────────────────────────────────────────────────────────────

    fn word_forward(&mut self) {
        if let Some(row) = self.doc.row(self.cursor.cy) {
            let cx = word::forward(row.raw(), self.cursor.cx);
            self.cursor.jump(self.cursor.cy, cx);
        }
    }

    fn word_backward(&mut self) {
        if let Some(row) = self.doc.row(self.cursor.cy) {
            let cx = word::backward(row.raw(), self.cursor.cx);
            self.cursor.jump(self.cursor.cy, cx);
        }
    }

    /// Move one full screen up, landing past the top edge of the window.
    fn page_up(&mut self) {
        self.cursor.jump(self.view.row_off, self.cursor.cx);
        for _ in 0..self.view.rows {
            self.cursor.move_up(&self.doc);
        }
        self.cursor.clamp(&self.doc);
    }

    fn page_down(&mut self) {
        let bottom = self
            .view
            .row_off
            .saturating_add(self.view.rows.saturating_sub(1))
            .min(self.doc.len());
        self.cursor.jump(bottom, self.cursor.cx);
        for _ in 0..self.view.rows {
            self.cursor.move_down(&self.doc);
        }
        self.cursor.clamp(&self.doc);
    }

    // ── Save ────────────────────────────────────────────────────────────────

    fn save(&mut self) -> io::Result<()> {
        if self.doc.filename().is_none() {
            let Some(name) = self.prompt("Save as: ", |_, _, _| {})? else {
                self.message.set("Save aborted");
                return Ok(());
            };
            self.doc.set_filename(PathBuf::from(name));
        }
        match self.doc.save() {
            Ok(n) => self.message.set(format!("{n} bytes written to disk")),
            Err(e) => self.message.set(format!("Can't save! I/O error: {e}")),
        }
        Ok(())
    }

    // ── Quit ────────────────────────────────────────────────────────────────

    /// Ask before discarding unsaved changes.
    fn confirm_quit(&mut self) -> io::Result<bool> {
        self.message
            .set("File has unsaved changes. Quit without saving? (y/n)");
        loop {
            self.refresh_screen()?;
            match input::read_key()? {
                Some(Key::Char('y' | 'Y')) => return Ok(true),
                Some(Key::Char('n' | 'N') | Key::Escape) => {
                    self.message.set("");
                    return Ok(false);
                }
                _ => {}
            }
        }
    }

    // ── Find ────────────────────────────────────────────────────────────────

    /// Incremental search. The match list is rebuilt on every edit of the
    /// pattern; arrows step through it with wraparound. Escape (or an empty
    /// pattern) restores the position saved when the prompt opened.
    fn find(&mut self) -> io::Result<()> {
        let saved = SearchState {
            cx: self.cursor.cx,
            cy: self.cursor.cy,
            row_off: self.view.row_off,
            col_off: self.view.col_off,
        };

        let mut matches = MatchSet::new();
        let mut pattern = String::new();
        let mut highlighted: Option<usize> = None;

        self.prompt("Search (Arrows to step, Enter/Esc): ", move |ed, input, key| {
            if let Some(row) = highlighted.take() {
                ed.doc.rehighlight_row(row);
            }

            match key {
                Key::Enter => return,
                Key::Escape => {
                    ed.cursor.jump(saved.cy, saved.cx);
                    ed.view.row_off = saved.row_off;
                    ed.view.col_off = saved.col_off;
                    return;
                }
                Key::Right | Key::Down => {
                    matches.next();
                }
                Key::Left | Key::Up => {
                    matches.previous();
                }
                _ => {
                    if input != pattern {
                        pattern.clear();
                        pattern.push_str(input);
                        matches = MatchSet::from_matches(search::scan(&ed.doc, input));
                    }
                }
            }

            if let Some(m) = matches.current() {
                ed.cursor.jump(m.row, m.col);
                ed.doc.highlight_match(m.row, m.col, input.chars().count());
                highlighted = Some(m.row);
            }
        })?;

        Ok(())
    }

    // ── Prompt ──────────────────────────────────────────────────────────────

    /// Read a line of input on the message bar.
    ///
    /// The callback sees every keypress with the input so far, which is how
    /// incremental search hooks in. Enter commits (empty input cancels, and
    /// the callback sees Escape for that case); Escape cancels.
    fn prompt<F>(&mut self, label: &str, mut callback: F) -> io::Result<Option<String>>
    where
        F: FnMut(&mut Self, &str, Key),
    {
        let mut input = String::new();
        loop {
            self.message.set(format!("{label}{input}"));
            self.refresh_screen()?;

            let Some(key) = input::read_key()? else {
                continue;
            };
            match key {
                Key::Enter => {
                    if input.is_empty() {
                        callback(self, &input, Key::Escape);
                        self.message.set("");
                        return Ok(None);
                    }
                    callback(self, &input, key);
                    self.message.set("");
                    return Ok(Some(input));
                }
                Key::Escape => {
                    callback(self, &input, key);
                    self.message.set("");
                    return Ok(None);
                }
                Key::Backspace | Key::Ctrl('h') => {
                    input.pop();
                    callback(self, &input, key);
                }
                Key::Char(ch) if !ch.is_control() => {
                    input.push(ch);
                    callback(self, &input, key);
                }
                other => callback(self, &input, other),
            }
        }
    }

    // ── Main loop ───────────────────────────────────────────────────────────

    /// Enter raw mode and run until quit. The blocking-with-timeout read in
    /// `read_key` is the only place the loop waits; a timeout tick falls
    /// through to a re-render, which is how resizes and message expiry show
    /// up without a keypress.
    fn run(&mut self) -> io::Result<()> {
        let mut term = Terminal::new()?;
        term.enter()?;

        self.message
            .set("HELP: Ctrl-O save | Ctrl-F find | Ctrl-Q quit");

        while !self.quit {
            self.view.resize(term.refresh_size());
            self.refresh_screen()?;
            if let Some(key) = input::read_key()? {
                self.process_key(key)?;
            }
        }

        term.leave()
    }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut editor = if args.len() > 1 {
        match Editor::from_file(Path::new(&args[1])) {
            Ok(editor) => editor,
            Err(e) => {
                eprintln!("quill: {}: {e}", args[1]);
                process::exit(1);
            }
        }
    } else {
        Editor::new()
    };

    if let Err(e) = editor.run() {
        eprintln!("quill: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// An editor over the given lines with an 80x24-equivalent text area.
    /// The document starts clean, as if freshly loaded.
    fn editor_with(lines: &[&str]) -> Editor {
        let mut e = Editor::new();
        e.doc = Document::from_text(&lines.join("\n"));
        e.view.rows = 22;
        e.view.cols = 80;
        e
    }

    fn press(e: &mut Editor, key: Key) {
        e.process_key(key).unwrap();
    }

    fn line(e: &Editor, i: usize) -> &str {
        e.doc.row(i).unwrap().raw()
    }

    // ── Editing ─────────────────────────────────────────────────────────

    #[test]
    fn typing_inserts_and_advances() {
        let mut e = editor_with(&[]);
        for ch in "hi".chars() {
            press(&mut e, Key::Char(ch));
        }
        assert_eq!(line(&e, 0), "hi");
        assert_eq!((e.cursor.cy, e.cursor.cx), (0, 2));
        assert!(e.doc.is_dirty());
    }

    #[test]
    fn backspace_at_end_of_line() {
        let mut e = editor_with(&["hello"]);
        e.cursor.jump(0, 5);
        press(&mut e, Key::Backspace);
        assert_eq!(line(&e, 0), "hell");
        assert_eq!(e.cursor.cx, 4);
    }

    #[test]
    fn backspace_at_column_zero_joins_rows() {
        let mut e = editor_with(&["abc", "def"]);
        e.cursor.jump(1, 0);
        press(&mut e, Key::Backspace);
        assert_eq!(e.doc.len(), 1);
        assert_eq!(line(&e, 0), "abcdef");
        assert_eq!((e.cursor.cy, e.cursor.cx), (0, 3));
    }

    #[test]
    fn backspace_at_origin_is_a_no_op() {
        let mut e = editor_with(&["abc"]);
        press(&mut e, Key::Backspace);
        assert_eq!(line(&e, 0), "abc");
        assert_eq!((e.cursor.cy, e.cursor.cx), (0, 0));
    }

    #[test]
    fn delete_removes_char_under_cursor() {
        let mut e = editor_with(&["abc"]);
        e.cursor.jump(0, 1);
        press(&mut e, Key::Delete);
        assert_eq!(line(&e, 0), "ac");
        assert_eq!(e.cursor.cx, 1);
    }

    #[test]
    fn delete_at_end_of_line_joins_next_row() {
        let mut e = editor_with(&["ab", "cd"]);
        e.cursor.jump(0, 2);
        press(&mut e, Key::Delete);
        assert_eq!(e.doc.len(), 1);
        assert_eq!(line(&e, 0), "abcd");
        assert_eq!((e.cursor.cy, e.cursor.cx), (0, 2));
    }

    #[test]
    fn enter_splits_row_at_cursor() {
        let mut e = editor_with(&["hello"]);
        e.cursor.jump(0, 2);
        press(&mut e, Key::Enter);
        assert_eq!(line(&e, 0), "he");
        assert_eq!(line(&e, 1), "llo");
        assert_eq!((e.cursor.cy, e.cursor.cx), (1, 0));
    }

    #[test]
    fn enter_in_empty_document_adds_rows() {
        let mut e = editor_with(&[]);
        press(&mut e, Key::Enter);
        press(&mut e, Key::Char('x'));
        assert_eq!(e.doc.len(), 2);
        assert_eq!(line(&e, 1), "x");
    }

    // ── Motion ──────────────────────────────────────────────────────────

    #[test]
    fn arrows_move_through_short_rows() {
        let mut e = editor_with(&["ab", "abcd", "x"]);
        press(&mut e, Key::Down);
        press(&mut e, Key::Down);
        assert_eq!(e.cursor.cy, 2);
    }

    #[test]
    fn home_and_end() {
        let mut e = editor_with(&["hello"]);
        press(&mut e, Key::End);
        assert_eq!(e.cursor.cx, 5);
        press(&mut e, Key::Home);
        assert_eq!(e.cursor.cx, 0);
    }

    #[test]
    fn word_forward_lands_on_next_word() {
        let mut e = editor_with(&["foo bar"]);
        press(&mut e, Key::Ctrl('n'));
        assert_eq!(e.cursor.cx, 4);
    }

    #[test]
    fn word_backward_returns_to_word_start() {
        let mut e = editor_with(&["foo bar"]);
        e.cursor.jump(0, 6);
        press(&mut e, Key::Ctrl('p'));
        assert_eq!(e.cursor.cx, 4);
    }

    #[test]
    fn page_down_then_up_spans_a_screen() {
        let lines: Vec<String> = (0..100).map(|i| format!("line {i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut e = editor_with(&refs);
        press(&mut e, Key::PageDown);
        assert_eq!(e.cursor.cy, 21 + 22);
        press(&mut e, Key::PageUp);
        assert_eq!(e.cursor.cy, 0);
    }

    #[test]
    fn page_down_stops_at_end_of_document() {
        let mut e = editor_with(&["a", "b", "c"]);
        press(&mut e, Key::PageDown);
        assert_eq!(e.cursor.cy, 3);
        assert_eq!(e.cursor.cx, 0);
    }

    // ── Quit ────────────────────────────────────────────────────────────

    #[test]
    fn fresh_editor_starts_clean() {
        let e = editor_with(&["abc", "def"]);
        assert!(!e.doc.is_dirty());
        assert_eq!(line(&e, 0), "abc");
        assert_eq!(line(&e, 1), "def");
    }

    #[test]
    fn quit_on_clean_document_is_immediate() {
        let mut e = editor_with(&["abc"]);
        press(&mut e, Key::Ctrl('q'));
        assert!(e.quit);
    }

    #[test]
    fn unbound_keys_change_nothing() {
        let mut e = editor_with(&["abc"]);
        press(&mut e, Key::Ctrl('z'));
        press(&mut e, Key::Escape);
        assert_eq!(line(&e, 0), "abc");
        assert_eq!((e.cursor.cy, e.cursor.cx), (0, 0));
        assert!(!e.doc.is_dirty());
        assert!(!e.quit);
    }
}
