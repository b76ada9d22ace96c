use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::enumerate::Enumerator;
use crate::store::Store;

/// Counts from one reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    /// Number of pairs in the snapshot
    pub listed: usize,
    /// Distinct identifiers the store did not hold before the pass
    pub added: usize,
    /// Writes to identifiers already held, or repeated within the snapshot
    pub updated: usize,
    /// Identifiers removed because the snapshot no longer lists them
    pub deleted: usize,
}

impl SyncStats {
    /// True when the pass changed store membership.
    pub fn membership_changed(&self) -> bool {
        self.added > 0 || self.deleted > 0
    }
}

/// Make `store` hold exactly the identifiers listed in `snapshot`.
///
/// Every listed pair is written unconditionally, in snapshot order, so the
/// last occurrence of a duplicated identifier wins and values whose content
/// changed without a membership change are still refreshed. Identifiers the
/// store held before the pass but the snapshot does not list are deleted
/// afterwards.
///
/// The pass is not atomic as a whole: concurrent readers may observe it
/// partially applied. Each single write or delete is atomic per the `Store`
/// contract.
pub fn reconcile<T, S, E>(store: &S, snapshot: &E) -> SyncStats
where
    S: Store<T> + ?Sized,
    E: Enumerator<T> + ?Sized,
{
    let mut stale = store.contains();
    let mut seen = HashSet::with_capacity(snapshot.len());
    let mut stats = SyncStats {
        listed: snapshot.len(),
        ..SyncStats::default()
    };

    for index in 0..stats.listed {
        let (id, object) = snapshot.get(index);
        store.update(id.clone(), object);

        let was_stale = stale.remove(&id);
        let first_seen = seen.insert(id);
        if was_stale || !first_seen {
            stats.updated += 1;
        } else {
            stats.added += 1;
        }
    }

    // Whatever is left was not reported by this snapshot
    for id in stale {
        store.delete(&id);
        stats.deleted += 1;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use proptest::prelude::*;

    /// Minimal store that records every mutation it receives.
    #[derive(Default)]
    struct RecordingStore {
        entries: Mutex<HashMap<String, u32>>,
        ops: Mutex<Vec<String>>,
    }

    impl RecordingStore {
        fn with(entries: &[(&str, u32)]) -> Self {
            let store = Self::default();
            for (id, value) in entries {
                store
                    .entries
                    .lock()
                    .unwrap()
                    .insert(id.to_string(), *value);
            }
            store
        }

        fn entries(&self) -> HashMap<String, u32> {
            self.entries.lock().unwrap().clone()
        }

        fn ops(&self) -> Vec<String> {
            self.ops.lock().unwrap().clone()
        }
    }

    impl Store<u32> for RecordingStore {
        fn contains(&self) -> HashSet<String> {
            self.entries.lock().unwrap().keys().cloned().collect()
        }

        fn update(&self, id: String, object: u32) {
            self.ops.lock().unwrap().push(format!("update {}", id));
            self.entries.lock().unwrap().insert(id, object);
        }

        fn delete(&self, id: &str) {
            self.ops.lock().unwrap().push(format!("delete {}", id));
            self.entries.lock().unwrap().remove(id);
        }
    }

    fn listing(pairs: &[(&str, u32)]) -> Vec<(String, u32)> {
        pairs.iter().map(|(id, v)| (id.to_string(), *v)).collect()
    }

    fn map(pairs: &[(&str, u32)]) -> HashMap<String, u32> {
        pairs.iter().map(|(id, v)| (id.to_string(), *v)).collect()
    }

    #[test]
    fn test_add_update_delete() {
        let store = RecordingStore::with(&[("a", 1), ("b", 2)]);

        let stats = reconcile(&store, &listing(&[("b", 5), ("c", 3)]));

        assert_eq!(store.entries(), map(&[("b", 5), ("c", 3)]));
        assert_eq!(
            stats,
            SyncStats {
                listed: 2,
                added: 1,
                updated: 1,
                deleted: 1,
            }
        );
        assert!(stats.membership_changed());
    }

    #[test]
    fn test_empty_snapshot_on_empty_store() {
        let store = RecordingStore::default();

        let stats = reconcile(&store, &listing(&[]));

        assert!(store.entries().is_empty());
        assert!(store.ops().is_empty());
        assert_eq!(stats, SyncStats::default());
    }

    #[test]
    fn test_empty_snapshot_clears_store() {
        let store = RecordingStore::with(&[("x", 1), ("y", 2)]);

        let stats = reconcile(&store, &listing(&[]));

        assert!(store.entries().is_empty());
        assert_eq!(stats.deleted, 2);
    }

    #[test]
    fn test_writes_precede_deletes() {
        let store = RecordingStore::with(&[("old", 1)]);

        reconcile(&store, &listing(&[("new", 2)]));

        assert_eq!(store.ops(), vec!["update new", "delete old"]);
    }

    #[test]
    fn test_unchanged_membership_still_refreshes_values() {
        let store = RecordingStore::with(&[("a", 1)]);

        let stats = reconcile(&store, &listing(&[("a", 9)]));

        assert_eq!(store.entries(), map(&[("a", 9)]));
        assert_eq!(stats.updated, 1);
        assert!(!stats.membership_changed());
    }

    #[test]
    fn test_duplicate_identifier_last_write_wins() {
        let store = RecordingStore::default();

        let stats = reconcile(&store, &listing(&[("a", 1), ("b", 2), ("a", 3)]));

        assert_eq!(store.entries(), map(&[("a", 3), ("b", 2)]));
        assert_eq!(stats.added, 2);
        assert_eq!(stats.updated, 1);
    }

    #[test]
    fn test_duplicate_of_existing_identifier_is_not_deleted() {
        let store = RecordingStore::with(&[("a", 1)]);

        let stats = reconcile(&store, &listing(&[("a", 2), ("a", 3)]));

        assert_eq!(store.entries(), map(&[("a", 3)]));
        assert_eq!(stats.deleted, 0);
        assert_eq!(stats.updated, 2);
    }

    #[test]
    fn test_second_pass_is_stable() {
        let store = RecordingStore::with(&[("a", 1), ("z", 0)]);
        let snapshot = listing(&[("a", 4), ("b", 2)]);

        reconcile(&store, &snapshot);
        let after_first = store.entries();
        let stats = reconcile(&store, &snapshot);

        assert_eq!(store.entries(), after_first);
        assert!(!stats.membership_changed());
        assert_eq!(stats.updated, 2);
    }

    #[test]
    fn test_works_through_trait_objects() {
        let store = RecordingStore::default();
        let dyn_store: &dyn Store<u32> = &store;
        let snapshot = listing(&[("a", 1)]);
        let dyn_snapshot: &dyn Enumerator<u32> = &snapshot;

        reconcile(dyn_store, dyn_snapshot);

        assert_eq!(store.entries(), map(&[("a", 1)]));
    }

    proptest! {
        #[test]
        fn prop_store_matches_snapshot(
            old in proptest::collection::hash_map("[a-e]", 0u32..10, 0..5),
            new in proptest::collection::vec(("[a-g]", 0u32..10), 0..8),
        ) {
            let store = RecordingStore::default();
            *store.entries.lock().unwrap() = old;

            reconcile(&store, &new);

            // Last occurrence in snapshot order wins
            let expected: HashMap<String, u32> = new.iter().cloned().collect();
            prop_assert_eq!(store.entries(), expected);
        }
    }
}
