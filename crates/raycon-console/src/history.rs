//! Bounded, move-to-front statement history.

use std::collections::VecDeque;

/// Previously executed statements, most recent first.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    max_size: usize,
    /// Index of the entry last shown by `previous`/`next`.
    cursor: Option<usize>,
}

impl History {
    /// Create an empty history holding at most `max_size` entries.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_size),
            max_size,
            cursor: None,
        }
    }

    /// Record `text`. An entry already present moves to the front; a new
    /// entry at capacity evicts the oldest. Resets navigation.
    pub fn add_if_needed(&mut self, text: &str) {
        self.cursor = None;
        if self.max_size == 0 {
            return;
        }
        if let Some(i) = self.entries.iter().position(|e| e == text) {
            if let Some(existing) = self.entries.remove(i) {
                self.entries.push_front(existing);
            }
            return;
        }
        if self.entries.len() >= self.max_size {
            self.entries.pop_back();
        }
        self.entries.push_front(text.to_string());
    }

    /// Step toward older entries, wrapping to the most recent.
    pub fn previous(&mut self) -> Option<&str> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }
        let i = match self.cursor {
            Some(i) => (i + 1) % len,
            None => 0,
        };
        self.cursor = Some(i);
        self.entries.get(i).map(String::as_str)
    }

    /// Step toward newer entries, wrapping to the oldest.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&str> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }
        let i = match self.cursor {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.cursor = Some(i);
        self.entries.get(i).map(String::as_str)
    }

    /// Forget the navigation position.
    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    /// Entries starting with `prefix`, most recent first.
    pub fn matches(&self, prefix: &str) -> Vec<&str> {
        if prefix.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|e| e.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }

    /// Entries from newest to oldest.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been submitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry and reset the cursor.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(h: &History) -> Vec<&str> {
        h.entries().collect()
    }

    #[test]
    fn repeated_entry_moves_to_front() {
        let mut h = History::new(10);
        for text in ["A", "B", "A"] {
            h.add_if_needed(text);
        }
        assert_eq!(entries(&h), ["A", "B"]);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut h = History::new(10);
        for i in 0..11 {
            h.add_if_needed(&format!("cmd{i}"));
        }
        assert_eq!(h.len(), 10);
        assert_eq!(h.entries().next(), Some("cmd10"));
        assert!(!entries(&h).contains(&"cmd0"));
        assert_eq!(entries(&h).last(), Some(&"cmd1"));
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let mut h = History::new(10);
        for text in ["first", "second", "third"] {
            h.add_if_needed(text);
        }
        assert_eq!(h.previous(), Some("third"));
        assert_eq!(h.previous(), Some("second"));
        assert_eq!(h.previous(), Some("first"));
        assert_eq!(h.previous(), Some("third"));
        assert_eq!(h.next(), Some("first"));
        assert_eq!(h.next(), Some("second"));
        h.reset_cursor();
        assert_eq!(h.next(), Some("first"));
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn navigation_on_empty_history() {
        let mut h = History::new(4);
        assert_eq!(h.previous(), None);
        assert_eq!(h.next(), None);
    }

    #[test]
    fn prefix_matches_most_recent_first() {
        let mut h = History::new(10);
        for text in ["Speed(1)", "Print(2)", "Speed(3)"] {
            h.add_if_needed(text);
        }
        assert_eq!(h.matches("Sp"), ["Speed(3)", "Speed(1)"]);
        assert!(h.matches("").is_empty());
    }

    #[test]
    fn clear_empties() {
        let mut h = History::new(2);
        h.add_if_needed("x");
        h.clear();
        assert!(h.is_empty());
        assert_eq!(h.previous(), None);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut h = History::new(0);
        h.add_if_needed("x");
        assert!(h.is_empty());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn bounded_unique_and_most_recent_first(
                items in proptest::collection::vec("[a-e]{1,2}", 0..40),
                cap in 1usize..8,
            ) {
                let mut h = History::new(cap);
                for item in &items {
                    h.add_if_needed(item);
                }
                let all: Vec<&str> = h.entries().collect();
                prop_assert!(all.len() <= cap);
                let mut dedup = all.clone();
                dedup.sort_unstable();
                dedup.dedup();
                prop_assert_eq!(dedup.len(), all.len());
                if let Some(last) = items.last() {
                    prop_assert_eq!(all[0], last.as_str());
                }
            }
        }
    }
}
