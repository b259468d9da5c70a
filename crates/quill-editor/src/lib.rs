//! # quill-editor — Editor core for quill
//!
//! The document engine behind the `quill` binary:
//!
//! - **[`row`]** — one line of text: raw content plus its derived,
//!   tab-expanded render form and per-character highlight classification
//! - **[`document`]** — the ordered row store with dirty tracking and file I/O
//! - **[`syntax`]** — the file-type ruleset table and the minimal classifier
//! - **[`search`]** — pattern scan, match set, circular navigation
//! - **[`cursor`]** — cursor with sticky-column vertical movement
//! - **[`word`]** — character classes and word-jump boundary scans
//! - **[`view`]** — the viewport compositor: scroll clamping, color runs,
//!   status and message bars
//!
//! Everything here is plain synchronous code over owned `Vec`s and
//! `String`s; the terminal protocol lives in `quill-term`.

pub mod cursor;
pub mod document;
pub mod row;
pub mod search;
pub mod syntax;
pub mod view;
pub mod word;
