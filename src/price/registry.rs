//! The shared price mapping and its lifecycle.
//!
//! One registry instance exists per process, explicitly constructed by the
//! host and handed to collaborators behind an `Arc` — there is no global.
//! The mapping is insertion-ordered so summary logs and replacement
//! accounting come out the same for the same inputs on every run.
//!
//! Lifecycle is a one-way state machine:
//!
//! ```text
//! NotStarted -> Building -> BuiltUnclean -> BuiltClean
//! ```
//!
//! Readers block until `BuiltUnclean` — never longer. Between unclean and
//! clean they may see entries the cleaner is about to remove; that window is
//! part of the contract.

use indexmap::IndexMap;
use std::sync::{Condvar, Mutex, RwLock};

use crate::catalog::ItemId;
use crate::price::record::PriceRecord;

/// Build/clean lifecycle states, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RegistryState {
    NotStarted,
    Building,
    BuiltUnclean,
    BuiltClean,
}

/// The shared registry. All writers (builder merge, cleaner removal,
/// modifier put) serialize on the map's write lock; lookups share the read
/// lock once the build has sealed.
pub struct PriceRegistry {
    records: RwLock<IndexMap<ItemId, PriceRecord>>,
    state: Mutex<RegistryState>,
    state_changed: Condvar,
}

impl PriceRegistry {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(IndexMap::new()),
            state: Mutex::new(RegistryState::NotStarted),
            state_changed: Condvar::new(),
        }
    }

    pub fn state(&self) -> RegistryState {
        *self.state.lock().expect("registry state mutex poisoned")
    }

    /// Look up a record, blocking until the registry reaches at least
    /// `BuiltUnclean`.
    ///
    /// There is deliberately no timeout: a caller that queries before any
    /// build was ever started parks until one completes. Callers never wait
    /// for the clean pass, so an entry the cleaner later removes can still
    /// be returned here once.
    pub fn get(&self, id: &ItemId) -> Option<PriceRecord> {
        self.wait_until_built();
        self.records
            .read()
            .expect("registry map lock poisoned")
            .get(id)
            .cloned()
    }

    /// Block the calling thread until state reaches `BuiltUnclean`.
    pub fn wait_until_built(&self) {
        let mut state = self.state.lock().expect("registry state mutex poisoned");
        while *state < RegistryState::BuiltUnclean {
            state = self
                .state_changed
                .wait(state)
                .expect("registry state mutex poisoned");
        }
    }

    /// Insert or replace one record. Returns true when an entry was
    /// replaced. Used by the runtime modifier once the registry is sealed.
    pub fn put(&self, record: PriceRecord) -> bool {
        self.records
            .write()
            .expect("registry map lock poisoned")
            .insert(record.id.clone(), record)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .expect("registry map lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ordered copy of every record, for summaries and the CLI dump.
    pub fn snapshot(&self) -> Vec<PriceRecord> {
        self.records
            .read()
            .expect("registry map lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Merge a source's records in order, returning (added, replaced)
    /// counts. Builder-only.
    pub(crate) fn merge(&self, records: Vec<PriceRecord>) -> (usize, usize) {
        let mut map = self.records.write().expect("registry map lock poisoned");
        let mut added = 0;
        let mut replaced = 0;
        for record in records {
            if map.insert(record.id.clone(), record).is_some() {
                replaced += 1;
            }
            added += 1;
        }
        (added, replaced)
    }

    /// Ordered key snapshot for the cleaner's sweep.
    pub(crate) fn keys(&self) -> Vec<ItemId> {
        self.records
            .read()
            .expect("registry map lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Remove one entry, keeping the order of the rest. Cleaner-only.
    pub(crate) fn remove(&self, id: &ItemId) -> bool {
        self.records
            .write()
            .expect("registry map lock poisoned")
            .shift_remove(id)
            .is_some()
    }

    /// `NotStarted -> Building`. A second build in one process is a
    /// programming error and faults immediately.
    pub(crate) fn begin_build(&self) {
        self.advance(RegistryState::NotStarted, RegistryState::Building);
    }

    /// `Building -> BuiltUnclean`; wakes every blocked reader.
    pub(crate) fn seal_unclean(&self) {
        self.advance(RegistryState::Building, RegistryState::BuiltUnclean);
    }

    /// `BuiltUnclean -> BuiltClean`.
    pub(crate) fn seal_clean(&self) {
        self.advance(RegistryState::BuiltUnclean, RegistryState::BuiltClean);
    }

    fn advance(&self, from: RegistryState, to: RegistryState) {
        let mut state = self.state.lock().expect("registry state mutex poisoned");
        assert!(
            *state == from,
            "illegal registry transition to {to:?}: state is {:?}, expected {from:?}",
            *state
        );
        *state = to;
        self.state_changed.notify_all();
    }
}

impl Default for PriceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn record(id: &str, buy: f64) -> PriceRecord {
        PriceRecord::new(id.parse().unwrap(), buy, buy / 2.0, 10.0, false, false)
    }

    #[test]
    fn merge_counts_replacements() {
        let registry = PriceRegistry::new();
        let (added, replaced) = registry.merge(vec![record("core:gem", 10.0)]);
        assert_eq!((added, replaced), (1, 0));

        let (added, replaced) =
            registry.merge(vec![record("core:gem", 20.0), record("core:iron", 5.0)]);
        assert_eq!((added, replaced), (2, 1));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn snapshot_preserves_insertion_order() {
        let registry = PriceRegistry::new();
        registry.merge(vec![
            record("core:zinc", 1.0),
            record("core:apple", 2.0),
            record("core:iron", 3.0),
        ]);
        // overwriting keeps the original slot
        registry.merge(vec![record("core:apple", 9.0)]);

        let ids: Vec<String> = registry
            .snapshot()
            .iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(ids, vec!["core:zinc", "core:apple", "core:iron"]);
    }

    #[test]
    fn get_blocks_until_sealed() {
        let registry = Arc::new(PriceRegistry::new());
        registry.begin_build();

        let reader = {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || registry.get(&"core:gem".parse().unwrap()))
        };

        // the reader must still be parked while we are mid-build
        std::thread::sleep(Duration::from_millis(50));
        assert!(!reader.is_finished());

        registry.merge(vec![record("core:gem", 10.0)]);
        registry.seal_unclean();

        let found = reader.join().unwrap();
        assert_eq!(found.unwrap().buy, 10.0);
    }

    #[test]
    fn get_after_seal_does_not_block() {
        let registry = PriceRegistry::new();
        registry.begin_build();
        registry.seal_unclean();
        assert!(registry.get(&"core:gem".parse().unwrap()).is_none());
    }

    #[test]
    #[should_panic(expected = "illegal registry transition")]
    fn building_twice_is_a_fault() {
        let registry = PriceRegistry::new();
        registry.begin_build();
        registry.begin_build();
    }

    #[test]
    #[should_panic(expected = "illegal registry transition")]
    fn sealing_unbuilt_registry_is_a_fault() {
        let registry = PriceRegistry::new();
        registry.seal_unclean();
    }
}
