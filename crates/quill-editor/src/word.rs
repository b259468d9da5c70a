//! Word jumps — boundary scans within a single row.
//!
//! Classifies a row's characters into blanks, word characters (letters,
//! digits, underscore), and punctuation, then finds the next or previous
//! run boundary. Jumps never leave the current row; the controller clamps
//! the result into the cursor.
//!
//! The scans are plain index arithmetic over the classified characters —
//! no repeated single-step cursor calls.

// ---------------------------------------------------------------------------
// Character classification
// ---------------------------------------------------------------------------

/// Character class for word boundary detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Letters, digits, underscore.
    Word,
    /// Non-blank, non-word characters (operators, brackets, etc.).
    Punctuation,
    /// Whitespace.
    Blank,
}

/// Classify a character for word jumps.
#[must_use]
pub fn classify(ch: char) -> CharClass {
    if ch.is_whitespace() {
        CharClass::Blank
    } else if ch.is_alphanumeric() || ch == '_' {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

// ---------------------------------------------------------------------------
// Jumps
// ---------------------------------------------------------------------------

/// Forward jump: the column of the next token start after `cx`.
///
/// Skips the remainder of the current run, then any blanks, and lands on
/// the first character of the next token. Returns the row length when no
/// further token exists.
#[must_use]
pub fn forward(raw: &str, cx: usize) -> usize {
    let chars: Vec<char> = raw.chars().collect();
    let len = chars.len();
    if cx >= len {
        return len;
    }

    let mut i = cx;
    let start = classify(chars[i]);

    // Skip the current token's run (blanks are handled by phase two).
    if start != CharClass::Blank {
        while i < len && classify(chars[i]) == start {
            i += 1;
        }
    }

    // Skip blanks to the next token start.
    while i < len && classify(chars[i]) == CharClass::Blank {
        i += 1;
    }

    i
}

/// Backward jump: the column of the current/previous token start before `cx`.
///
/// Steps left over blanks, then to the first character of the run it
/// lands in. Returns 0 at the row start.
#[must_use]
pub fn backward(raw: &str, cx: usize) -> usize {
    let chars: Vec<char> = raw.chars().collect();
    let mut i = cx.min(chars.len());
    if i == 0 {
        return 0;
    }

    // Step over blanks immediately left of the cursor.
    while i > 0 && classify(chars[i - 1]) == CharClass::Blank {
        i -= 1;
    }
    if i == 0 {
        return 0;
    }

    // Walk to the start of the run now left of the cursor.
    let class = classify(chars[i - 1]);
    while i > 0 && classify(chars[i - 1]) == class {
        i -= 1;
    }

    i
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classify_basics() {
        assert_eq!(classify('a'), CharClass::Word);
        assert_eq!(classify('9'), CharClass::Word);
        assert_eq!(classify('_'), CharClass::Word);
        assert_eq!(classify(' '), CharClass::Blank);
        assert_eq!(classify('\t'), CharClass::Blank);
        assert_eq!(classify('.'), CharClass::Punctuation);
        assert_eq!(classify('('), CharClass::Punctuation);
    }

    #[test]
    fn forward_to_next_word() {
        // "foo bar", cx=0 → start of "bar".
        assert_eq!(forward("foo bar", 0), 4);
    }

    #[test]
    fn forward_from_mid_word() {
        assert_eq!(forward("foo bar", 1), 4);
    }

    #[test]
    fn forward_over_punctuation_boundary() {
        // Word run ends where the punctuation run begins.
        assert_eq!(forward("foo.bar", 0), 3);
        assert_eq!(forward("foo.bar", 3), 4);
    }

    #[test]
    fn forward_from_blank_lands_on_next_token() {
        assert_eq!(forward("foo bar", 3), 4);
    }

    #[test]
    fn forward_at_last_token_stops_at_end() {
        assert_eq!(forward("foo bar", 4), 7);
        assert_eq!(forward("foo bar", 7), 7);
    }

    #[test]
    fn forward_on_empty_row() {
        assert_eq!(forward("", 0), 0);
    }

    #[test]
    fn forward_through_runs_of_blanks() {
        assert_eq!(forward("a   b", 0), 4);
    }

    #[test]
    fn backward_to_word_start() {
        // cx=4 (start of "bar") → 0 (start of "foo").
        assert_eq!(backward("foo bar", 4), 0);
    }

    #[test]
    fn backward_from_mid_word() {
        assert_eq!(backward("foo bar", 6), 4);
    }

    #[test]
    fn backward_from_row_end() {
        assert_eq!(backward("foo bar", 7), 4);
    }

    #[test]
    fn backward_over_punctuation() {
        assert_eq!(backward("foo.bar", 4), 3);
        assert_eq!(backward("foo.bar", 3), 0);
    }

    #[test]
    fn backward_at_row_start() {
        assert_eq!(backward("foo", 0), 0);
    }

    #[test]
    fn backward_on_empty_row() {
        assert_eq!(backward("", 0), 0);
    }

    #[test]
    fn forward_backward_round_trip() {
        let row = "alpha beta gamma";
        let there = forward(row, 0);
        assert_eq!(there, 6);
        assert_eq!(backward(row, there), 0);
    }
}
