// Dedup ledger: the set of post ids already in the store.

use std::collections::HashSet;

use tracing::{info, warn};

use super::csv::{CsvStore, StoreError};

/// In-memory set of persisted ids. Grows during a run, never shrinks.
#[derive(Debug, Clone, Default)]
pub struct DedupLedger {
    ids: HashSet<String>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every id in the store. A store that doesn't exist yet, or can't be
    /// read, yields an empty ledger.
    pub fn load(store: &CsvStore) -> Self {
        match store.read_ids() {
            Ok(ids) => {
                let ledger: Self = ids.into_iter().collect();
                info!(ids = ledger.len(), path = %store.path().display(), "Loaded dedup ledger");
                ledger
            }
            Err(StoreError::NotFound(_)) => {
                info!(path = %store.path().display(), "No existing store, starting with an empty ledger");
                Self::new()
            }
            Err(e) => {
                warn!(error = %e, "Could not read existing store, starting with an empty ledger");
                Self::new()
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Record an id. Returns `true` if it was not seen before.
    pub fn add(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<String> for DedupLedger {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_reports_novelty() {
        let mut ledger = DedupLedger::new();
        assert!(ledger.add("1"));
        assert!(!ledger.add("1"));
        assert!(ledger.contains("1"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn load_from_missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = DedupLedger::load(&CsvStore::new(dir.path().join("absent.csv")));
        assert!(ledger.is_empty());
    }

    #[test]
    fn ids_in_rows_with_invalid_utf8_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.csv");
        std::fs::write(&path, b"\"Post_ID\",\"Post_Content\"\n\"4\",\"ok\"\n\"5\",\"caf\xe9\"\n").unwrap();
        let ledger = DedupLedger::load(&CsvStore::new(path));
        assert!(ledger.contains("4"));
        assert!(ledger.contains("5"));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn load_from_store_without_id_column_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odd.csv");
        std::fs::write(&path, "\"Other\"\n\"x\"\n").unwrap();
        assert!(DedupLedger::load(&CsvStore::new(path)).is_empty());
    }
}
