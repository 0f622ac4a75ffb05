use crate::error::{PatrolError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// CounterStore
// ---------------------------------------------------------------------------

/// Durable submission counters, persisted as a single JSON document at
/// `.patrol/counters.json` and always rewritten whole.
///
/// `today` counts submissions since the store was first created and is never
/// reset on a calendar boundary; `total` is the all-time count. After every
/// successful commit `total == sum(users.values())` and `today <= total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CounterStore {
    pub today: u64,
    pub total: u64,
    pub last_name: String,
    pub last_by: String,
    pub users: BTreeMap<String, u64>,
}

impl Default for CounterStore {
    fn default() -> Self {
        Self {
            today: 0,
            total: 0,
            last_name: "-".to_string(),
            last_by: "-".to_string(),
            users: BTreeMap::new(),
        }
    }
}

impl CounterStore {
    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    /// Load the store, substituting defaults when the file is missing or
    /// unparsable. A corrupt store is reset, not recovered field-by-field;
    /// read failures are never surfaced to the caller.
    pub fn load_or_default(root: &Path) -> Self {
        let path = paths::counters_path(root);
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "counter store unreadable, using defaults");
                return Self::default();
            }
        };
        match serde_json::from_str(&data) {
            Ok(store) => store,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "counter store unparsable, resetting to defaults");
                Self::default()
            }
        }
    }

    /// Persist the full store, overwriting prior contents.
    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::counters_path(root);
        let data = serde_json::to_vec_pretty(self)?;
        crate::io::atomic_write(&path, &data)
            .map_err(|source| PatrolError::StoreWrite { path, source })
    }

    // ---------------------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------------------

    /// Fold one committed submission into the counters.
    pub fn record(&mut self, subject_display: &str, submitted_by: &str) {
        self.today += 1;
        self.total += 1;
        self.last_name = subject_display.to_string();
        self.last_by = submitted_by.to_string();
        *self.users.entry(submitted_by.to_string()).or_insert(0) += 1;
    }

    /// Ranked `(submitter, count)` pairs, count descending. The sort is
    /// stable, so ties keep the map's iteration order.
    pub fn ranked_users(&self) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> =
            self.users.iter().map(|(u, c)| (u.clone(), *c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let store = CounterStore::load_or_default(dir.path());
        assert_eq!(store, CounterStore::default());
    }

    #[test]
    fn defaults_when_corrupt() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".patrol")).unwrap();
        std::fs::write(dir.path().join(".patrol/counters.json"), "{not json").unwrap();
        let store = CounterStore::load_or_default(dir.path());
        assert_eq!(store, CounterStore::default());
    }

    #[test]
    fn first_submission_from_empty_store() {
        let mut store = CounterStore::default();
        store.record("Max", "alice");

        assert_eq!(store.today, 1);
        assert_eq!(store.total, 1);
        assert_eq!(store.last_name, "Max");
        assert_eq!(store.last_by, "alice");
        assert_eq!(store.users.get("alice"), Some(&1));
        assert_eq!(store.users.len(), 1);
    }

    #[test]
    fn counters_stay_consistent() {
        let mut store = CounterStore::default();
        for (subject, by) in [("Max", "alice"), ("Erika", "bob"), ("Max", "alice")] {
            store.record(subject, by);
            assert_eq!(store.total, store.users.values().sum::<u64>());
            assert!(store.today <= store.total);
        }
        assert_eq!(store.users.get("alice"), Some(&2));
        assert_eq!(store.users.get("bob"), Some(&1));
    }

    #[test]
    fn store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut store = CounterStore::default();
        store.record("Max", "alice");
        store.record("Erika", "bob");
        store.save(dir.path()).unwrap();

        let loaded = CounterStore::load_or_default(dir.path());
        assert_eq!(loaded, store);
    }

    #[test]
    fn wire_format_keys() {
        let mut store = CounterStore::default();
        store.record("Max", "alice");
        let json = serde_json::to_string(&store).unwrap();
        assert!(json.contains("\"today\""));
        assert!(json.contains("\"total\""));
        assert!(json.contains("\"lastName\""));
        assert!(json.contains("\"lastBy\""));
        assert!(json.contains("\"users\""));
    }

    #[test]
    fn reads_existing_wire_document() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".patrol")).unwrap();
        std::fs::write(
            dir.path().join(".patrol/counters.json"),
            r#"{"today":2,"total":5,"lastName":"Max","lastBy":"alice","users":{"alice":3,"bob":2}}"#,
        )
        .unwrap();

        let store = CounterStore::load_or_default(dir.path());
        assert_eq!(store.today, 2);
        assert_eq!(store.total, 5);
        assert_eq!(store.last_name, "Max");
        assert_eq!(store.last_by, "alice");
        assert_eq!(store.users.get("bob"), Some(&2));
    }

    #[test]
    fn ranked_users_sorted_by_count_descending() {
        let mut store = CounterStore::default();
        store.users.insert("a".into(), 3);
        store.users.insert("b".into(), 5);
        store.users.insert("c".into(), 3);

        let ranked = store.ranked_users();
        assert_eq!(ranked[0], ("b".to_string(), 5));
        // Stable sort: ties keep iteration order.
        assert_eq!(ranked[1], ("a".to_string(), 3));
        assert_eq!(ranked[2], ("c".to_string(), 3));
    }

    #[test]
    fn save_fails_when_target_is_a_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".patrol/counters.json")).unwrap();

        let store = CounterStore::default();
        let err = store.save(dir.path()).unwrap_err();
        assert!(matches!(err, PatrolError::StoreWrite { .. }));
    }
}
