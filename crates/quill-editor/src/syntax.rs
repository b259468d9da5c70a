//! Syntax classification — the minimal per-character tagger.
//!
//! Each render character of a row carries one [`Highlight`] tag that drives
//! the compositor's color runs. The classifier is deliberately small: a
//! number-run recognizer gated by a per-file-type flag set, plus the `Match`
//! tag the search engine paints over spans it found. Full language parsing
//! is out of scope — this is a token classifier, not a grammar.
//!
//! File types live in a static ruleset table keyed by extension. A document
//! selects its ruleset once, when a file is opened or named, and rows
//! reference it (by `&'static`) for every highlight pass.

use std::path::Path;

use bitflags::bitflags;

// ---------------------------------------------------------------------------
// Highlight classification
// ---------------------------------------------------------------------------

/// Per-render-character highlight classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// Ordinary text, drawn in the default foreground.
    Normal,
    /// Part of a numeric literal.
    Number,
    /// Part of the span of an active search match.
    Match,
}

impl Highlight {
    /// The SGR foreground parameter for this classification, or `None`
    /// for the default foreground (SGR 39).
    #[must_use]
    pub const fn sgr_code(self) -> Option<u8> {
        match self {
            Self::Normal => None,
            Self::Number => Some(31),
            Self::Match => Some(34),
        }
    }
}

bitflags! {
    /// Feature flags of a file-type ruleset.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SyntaxFlags: u8 {
        /// Classify numeric literals as [`Highlight::Number`].
        const NUMBERS = 0b0000_0001;
    }
}

// ---------------------------------------------------------------------------
// Ruleset table
// ---------------------------------------------------------------------------

/// An immutable file-type ruleset: display name, matching extensions,
/// and the classifier features it enables.
#[derive(Debug)]
pub struct Syntax {
    /// Name shown in the status bar ("c", "rust", ...).
    pub name: &'static str,
    /// File extensions (with dot) that select this ruleset.
    pub extensions: &'static [&'static str],
    /// Enabled classifier features.
    pub flags: SyntaxFlags,
}

/// The built-in ruleset table.
pub static SYNTAXES: &[Syntax] = &[
    Syntax {
        name: "c",
        extensions: &[".c", ".h", ".cpp", ".cc", ".hpp"],
        flags: SyntaxFlags::NUMBERS,
    },
    Syntax {
        name: "rust",
        extensions: &[".rs"],
        flags: SyntaxFlags::NUMBERS,
    },
    Syntax {
        name: "python",
        extensions: &[".py"],
        flags: SyntaxFlags::NUMBERS,
    },
];

/// Select the ruleset for a file name by extension match.
///
/// Returns `None` for unknown extensions — rows then classify everything
/// as [`Highlight::Normal`].
#[must_use]
pub fn detect(path: &Path) -> Option<&'static Syntax> {
    let name = path.file_name()?.to_str()?;
    SYNTAXES
        .iter()
        .find(|syntax| syntax.extensions.iter().any(|ext| name.ends_with(ext)))
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Characters that terminate a token, allowing a new number run to start
/// immediately after them.
const SEPARATORS: &str = ",.()+-/*=~%<>[];";

/// Whether `ch` separates tokens for number-run recognition.
#[must_use]
pub fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || ch == '\0' || SEPARATORS.contains(ch)
}

/// Classify every character of a render line.
///
/// Number rule: a digit starts or continues a `Number` run when the
/// previous character was itself `Number` or a separator; a `.` continues
/// a run only when the previous character was `Number` (decimals, not
/// exponents). With no ruleset, or with numbers disabled, everything is
/// `Normal`. Search-match spans are painted afterwards by the caller —
/// this pass always resets them.
#[must_use]
pub fn classify_line(render: &str, syntax: Option<&Syntax>) -> Vec<Highlight> {
    let numbers = syntax.is_some_and(|s| s.flags.contains(SyntaxFlags::NUMBERS));
    if !numbers {
        return render.chars().map(|_| Highlight::Normal).collect();
    }

    let mut hl = Vec::with_capacity(render.chars().count());
    let mut prev_sep = true;
    let mut prev_hl = Highlight::Normal;

    for ch in render.chars() {
        let tag = if ch.is_ascii_digit() && (prev_sep || prev_hl == Highlight::Number) {
            Highlight::Number
        } else if ch == '.' && prev_hl == Highlight::Number {
            Highlight::Number
        } else {
            Highlight::Normal
        };

        hl.push(tag);
        prev_hl = tag;
        prev_sep = is_separator(ch);
    }

    hl
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
