//! Search — incremental literal search with a navigable match set.
//!
//! The scan is one pass over the rows in order, taking the **first**
//! occurrence of the pattern in each row (case-sensitive substring).
//! Every hit is appended to the match set; the editor jumps to the last
//! hit found, and `next`/`previous` walk the set circularly from there.
//!
//! The match set is a plain `Vec` plus a current index — navigation is
//! index arithmetic modulo the length, wrapping in both directions.
//!
//! # Lifecycle
//!
//! The set is rebuilt on every keystroke of the find prompt and discarded
//! when the prompt closes. [`SearchState`] remembers the cursor and
//! scroll position from before the search so Escape restores them.

use crate::document::Document;

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// One search hit: row index and char column of the match start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// Row index of the hit.
    pub row: usize,
    /// Char column of the first matched character.
    pub col: usize,
}

/// Scan the whole document for `pattern`.
///
/// Returns the first occurrence per row, in row order. An empty pattern
/// matches nothing.
#[must_use]
pub fn scan(doc: &Document, pattern: &str) -> Vec<SearchMatch> {
    if pattern.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for (row, r) in doc.rows().iter().enumerate() {
        if let Some(byte) = r.raw().find(pattern) {
            let col = r.raw()[..byte].chars().count();
            matches.push(SearchMatch { row, col });
        }
    }
    matches
}

// ---------------------------------------------------------------------------
// MatchSet
// ---------------------------------------------------------------------------

/// An ordered, circularly navigable set of search hits.
#[derive(Debug, Default)]
pub struct MatchSet {
    matches: Vec<SearchMatch>,
    current: usize,
}

impl MatchSet {
    /// An empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            matches: Vec::new(),
            current: 0,
        }
    }

    /// Build a set from scan results.
    ///
    /// The current position starts on the **last** hit — the one the scan
    /// left the cursor on — so `next` wraps around to the first.
    #[must_use]
    pub fn from_matches(matches: Vec<SearchMatch>) -> Self {
        let current = matches.len().saturating_sub(1);
        Self { matches, current }
    }

    /// Whether the set holds no hits.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Number of hits.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// All hits in row order.
    #[inline]
    #[must_use]
    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    /// The hit under the navigation pointer.
    #[must_use]
    pub fn current(&self) -> Option<SearchMatch> {
        self.matches.get(self.current).copied()
    }

    /// Advance to the next hit, wrapping to the first after the last.
    pub fn next(&mut self) -> Option<SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.matches.len();
        self.current()
    }

    /// Step to the previous hit, wrapping to the last before the first.
    pub fn previous(&mut self) -> Option<SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }
        self.current = (self.current + self.matches.len() - 1) % self.matches.len();
        self.current()
    }
}

// ---------------------------------------------------------------------------
// SearchState
// ---------------------------------------------------------------------------

/// Cursor and scroll position saved when the find prompt opens,
/// restored when the search is cancelled.
#[derive(Debug, Clone, Copy)]
pub struct SearchState {
    /// Saved char column.
    pub cx: usize,
    /// Saved row index.
    pub cy: usize,
    /// Saved vertical scroll offset.
    pub row_off: usize,
    /// Saved horizontal scroll offset.
    pub col_off: usize,
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
    fn finds_unique_pattern() {
        let d = doc(&["abc", "xdefy", "z"]);
        let hits = scan(&d, "def");
        assert_eq!(hits, vec![SearchMatch { row: 1, col: 1 }]);
    }

    #[test]
    fn finds_first_occurrence_per_row() {
        let d = doc(&["ab ab", "xx", "ab"]);
        let hits = scan(&d, "ab");
        assert_eq!(
            hits,
            vec![
                SearchMatch { row: 0, col: 0 },
                SearchMatch { row: 2, col: 0 },
            ]
        );
    }

    #[test]
    fn search_is_case_sensitive() {
        let d = doc(&["Hello"]);
        assert!(scan(&d, "hello").is_empty());
        assert_eq!(scan(&d, "Hello").len(), 1);
    }

    #[test]
    fn empty_pattern_matches_nothing() {
        let d = doc(&["abc"]);
        assert!(scan(&d, "").is_empty());
    }

    #[test]
    fn no_match_yields_empty_set() {
        let d = doc(&["abc"]);
        assert!(scan(&d, "zzz").is_empty());
    }

    #[test]
    fn col_counts_chars_not_bytes() {
        let d = doc(&["héllo def"]);
        let hits = scan(&d, "def");
        assert_eq!(hits, vec![SearchMatch { row: 0, col: 6 }]);
    }

    #[test]
    fn set_starts_on_last_hit() {
        let set = MatchSet::from_matches(vec![
            SearchMatch { row: 0, col: 0 },
            SearchMatch { row: 2, col: 1 },
        ]);
        assert_eq!(set.current(), Some(SearchMatch { row: 2, col: 1 }));
    }

    #[test]
    fn next_wraps_forward() {
        let mut set = MatchSet::from_matches(vec![
            SearchMatch { row: 0, col: 0 },
            SearchMatch { row: 1, col: 0 },
            SearchMatch { row: 2, col: 0 },
        ]);
        // Starts on the last hit; next wraps to the first.
        assert_eq!(set.next().unwrap().row, 0);
        assert_eq!(set.next().unwrap().row, 1);
        assert_eq!(set.next().unwrap().row, 2);
        assert_eq!(set.next().unwrap().row, 0);
    }

    #[test]
    fn previous_wraps_backward() {
        let mut set = MatchSet::from_matches(vec![
            SearchMatch { row: 0, col: 0 },
            SearchMatch { row: 1, col: 0 },
        ]);
        assert_eq!(set.previous().unwrap().row, 0);
        assert_eq!(set.previous().unwrap().row, 1);
        assert_eq!(set.previous().unwrap().row, 0);
    }

    #[test]
    fn empty_set_navigation() {
        let mut set = MatchSet::new();
        assert!(set.is_empty());
        assert_eq!(set.next(), None);
        assert_eq!(set.previous(), None);
        assert_eq!(set.current(), None);
    }

    #[test]
    fn single_hit_wraps_to_itself() {
        let mut set = MatchSet::from_matches(vec![SearchMatch { row: 3, col: 2 }]);
        assert_eq!(set.next().unwrap().row, 3);
        assert_eq!(set.previous().unwrap().row, 3);
    }
}
