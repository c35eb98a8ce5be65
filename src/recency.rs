use itertools::Itertools;

use crate::error::StorageError;
use crate::storage::StateStore;

pub const RECENT_KEY: &str = "recentPickedSlugs";
/// How many past picks are remembered to avoid repeats
pub const RECENT_LIMIT: usize = 50;

/// Bounded, most-recent-first history of drawn slugs
#[derive(Debug)]
pub struct RecencyStore<S: StateStore> {
    store: S,
}

impl<S: StateStore> RecencyStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Newest first. Missing, unreadable or malformed state reads as an
    /// empty history.
    pub fn get_recent(&self) -> Vec<String> {
        let raw = match self.store.get(RECENT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "could not read recency history");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Option<Vec<String>>>(&raw) {
            Ok(recent) => recent.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed recency history");
                Vec::new()
            }
        }
    }

    /// Put `new_slugs` in front of the history, keep the first occurrence of
    /// every slug and drop everything past [`RECENT_LIMIT`].
    pub fn record_selection<I, T>(&self, new_slugs: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let merged: Vec<String> = new_slugs
            .into_iter()
            .map(Into::into)
            .chain(self.get_recent())
            .unique()
            .take(RECENT_LIMIT)
            .collect();

        tracing::debug!(len = merged.len(), "recording recency history");
        // Serializing a Vec<String> cannot fail
        let encoded = serde_json::to_string(&merged).unwrap_or_else(|_| "[]".to_string());
        self.store.set(RECENT_KEY, &encoded)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(RECENT_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStateStore;
    use std::collections::HashSet;

    fn create_test_store() -> RecencyStore<MemoryStateStore> {
        RecencyStore::new(MemoryStateStore::new())
    }

    #[test]
    fn test_empty_history() {
        let recency = create_test_store();
        assert!(recency.get_recent().is_empty());
    }

    #[test]
    fn test_newest_first() {
        let recency = create_test_store();
        recency.record_selection(["a", "b"]).unwrap();
        recency.record_selection(["c", "d"]).unwrap();
        assert_eq!(recency.get_recent(), vec!["c", "d", "a", "b"]);
    }

    #[test]
    fn test_reselected_slug_moves_to_front() {
        let recency = create_test_store();
        recency.record_selection(["a", "b", "c"]).unwrap();
        recency.record_selection(["c", "x"]).unwrap();
        assert_eq!(recency.get_recent(), vec!["c", "x", "a", "b"]);
    }

    #[test]
    fn test_duplicates_within_one_selection_collapse() {
        let recency = create_test_store();
        recency.record_selection(["a", "a", "b"]).unwrap();
        assert_eq!(recency.get_recent(), vec!["a", "b"]);
    }

    #[test]
    fn test_history_is_bounded_and_unique() {
        let recency = create_test_store();

        for round in 0..40 {
            // Overlapping batches so dedupe and truncation both kick in
            let batch: Vec<String> = (0..4).map(|i| format!("p{}", (round * 3 + i) % 70)).collect();
            recency.record_selection(batch).unwrap();

            let recent = recency.get_recent();
            assert!(recent.len() <= RECENT_LIMIT);
            let unique: HashSet<_> = recent.iter().collect();
            assert_eq!(unique.len(), recent.len());
        }

        assert_eq!(recency.get_recent().len(), RECENT_LIMIT);
    }

    #[test]
    fn test_truncation_keeps_newest() {
        let recency = create_test_store();
        let old: Vec<String> = (0..RECENT_LIMIT).map(|i| format!("old{i}")).collect();
        recency.record_selection(old).unwrap();
        recency.record_selection(["new"]).unwrap();

        let recent = recency.get_recent();
        assert_eq!(recent.len(), RECENT_LIMIT);
        assert_eq!(recent[0], "new");
        assert_eq!(recent[RECENT_LIMIT - 1], format!("old{}", RECENT_LIMIT - 2));
    }

    #[test]
    fn test_malformed_state_reads_as_empty() {
        let store = MemoryStateStore::new();
        store.set(RECENT_KEY, "{not json").unwrap();
        let recency = RecencyStore::new(&store);
        assert!(recency.get_recent().is_empty());

        store.set(RECENT_KEY, r#"{"a": 1}"#).unwrap();
        assert!(recency.get_recent().is_empty());

        store.set(RECENT_KEY, "null").unwrap();
        assert!(recency.get_recent().is_empty());

        // Recording over corrupt state starts a fresh history
        store.set(RECENT_KEY, "[1, 2").unwrap();
        recency.record_selection(["fresh"]).unwrap();
        assert_eq!(recency.get_recent(), vec!["fresh"]);
    }

    #[test]
    fn test_clear() {
        let recency = create_test_store();
        recency.record_selection(["a"]).unwrap();
        recency.clear().unwrap();
        assert!(recency.get_recent().is_empty());
    }
}
