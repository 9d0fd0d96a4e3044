//! # Snapshot History
//!
//! Linear undo/redo over whole-document snapshots.
//!
//! ## Design
//!
//! - `entries[cursor]` is always the state on screen
//! - Pushing a snapshot equal to the current one is a no-op
//! - Pushing away from the tail truncates everything after the cursor first
//! - Pushes are suppressed while a snapshot is being replayed, so observers
//!   that record every content change do not record undo itself
//! - The first snapshot is kept as the original; `reset` returns to it even
//!   after old entries were trimmed
//!
//! ## Example
//!
//! ```rust
//! use pagecraft_editor::SnapshotHistory;
//!
//! let mut history = SnapshotHistory::new("<p>a</p>".to_string());
//! history.push("<p>b</p>".to_string());
//!
//! assert_eq!(history.undo().map(String::as_str), Some("<p>a</p>"));
//! assert_eq!(history.redo().map(String::as_str), Some("<p>b</p>"));
//! ```

/// Undo/redo history of document snapshots
#[derive(Debug, Clone)]
pub struct SnapshotHistory<S> {
    entries: Vec<S>,
    cursor: usize,
    original: Option<S>,
    replaying: bool,
    /// Maximum number of entries kept (0 = unlimited)
    max_entries: usize,
}

impl<S> Default for SnapshotHistory<S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S> SnapshotHistory<S> {
    /// History whose first push becomes the original
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            original: None,
            replaying: false,
            max_entries: 0,
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn current(&self) -> Option<&S> {
        self.entries.get(self.cursor)
    }

    pub fn original(&self) -> Option<&S> {
        self.original.as_ref()
    }

    pub fn entries(&self) -> &[S] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Mark the start of applying a snapshot; pushes are ignored until
    /// [`end_replay`](Self::end_replay)
    pub fn begin_replay(&mut self) {
        self.replaying = true;
    }

    pub fn end_replay(&mut self) {
        self.replaying = false;
    }

    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    /// Step back one entry. No-op at the first entry.
    pub fn undo(&mut self) -> Option<&S> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.current()
    }

    /// Step forward one entry. No-op at the tail.
    pub fn redo(&mut self) -> Option<&S> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.current()
    }
}

impl<S: Clone + PartialEq> SnapshotHistory<S> {
    pub fn new(original: S) -> Self {
        let mut history = Self::empty();
        history.push(original);
        history
    }

    /// Record a snapshot. Returns whether an entry was added.
    pub fn push(&mut self, snapshot: S) -> bool {
        if self.replaying || self.current() == Some(&snapshot) {
            return false;
        }

        if self.original.is_none() {
            self.original = Some(snapshot.clone());
        }

        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(snapshot);

        // Trim if exceeded max entries
        if self.max_entries > 0 && self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }

        self.cursor = self.entries.len() - 1;
        true
    }

    /// Drop every entry and return to the original snapshot
    pub fn reset(&mut self) -> Option<&S> {
        let original = self.original.clone()?;
        self.entries = vec![original];
        self.cursor = 0;
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(items: &[&str]) -> SnapshotHistory<String> {
        let mut history = SnapshotHistory::empty();
        for item in items {
            history.push(item.to_string());
        }
        history
    }

    #[test]
    fn test_history_creation() {
        let history: SnapshotHistory<String> = SnapshotHistory::empty();
        assert_eq!(history.len(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.current(), None);
    }

    #[test]
    fn test_push_after_undo_truncates_branch() {
        let mut history = history_of(&["h1", "h2"]);
        history.undo();
        history.push("h3".to_string());

        assert_eq!(history.entries(), ["h1", "h3"]);
        assert_eq!(history.cursor(), 1);
    }

    #[test]
    fn test_duplicate_push_is_ignored() {
        let mut history = history_of(&["a"]);
        assert!(history.push("x".to_string()));
        assert!(!history.push("x".to_string()));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_undo_redo_walk() {
        let items = ["h1", "h2", "h3", "h4", "h5"];
        let mut history = history_of(&items);

        for _ in 0..items.len() - 1 {
            assert!(history.undo().is_some());
        }
        assert_eq!(history.current().map(String::as_str), Some("h1"));
        assert_eq!(history.undo(), None);

        for _ in 0..items.len() - 1 {
            assert!(history.redo().is_some());
        }
        assert_eq!(history.current().map(String::as_str), Some("h5"));
        assert_eq!(history.cursor(), items.len() - 1);
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_reset_returns_to_original() {
        let mut history = history_of(&["start", "b", "c"]);
        history.undo();

        assert_eq!(history.reset().map(String::as_str), Some("start"));
        assert_eq!(history.entries(), ["start"]);
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_push_suppressed_during_replay() {
        let mut history = history_of(&["a", "b"]);
        history.undo();

        history.begin_replay();
        assert!(!history.push("a-replayed".to_string()));
        history.end_replay();

        assert_eq!(history.entries(), ["a", "b"]);
        assert!(history.can_redo());
    }

    #[test]
    fn test_max_entries_keeps_original_for_reset() {
        let mut history = SnapshotHistory::new("orig".to_string()).with_max_entries(2);
        for i in 0..5 {
            history.push(format!("v{}", i));
        }

        assert_eq!(history.entries(), ["v3", "v4"]);
        assert_eq!(history.cursor(), 1);
        assert_eq!(history.reset().map(String::as_str), Some("orig"));
    }
}
