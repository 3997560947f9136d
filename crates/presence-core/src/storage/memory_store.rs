//! MemoryStore — non-persistent stand-in for hosts without writable disk
//!
//! Same contract as the durable store for the lifetime of the process.
//! Everything is gone on restart.

use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::{now, PresenceStore};
use crate::error::Result;
use crate::record::{NewPresence, PresencePatch, PresenceRecord, RecordId};
use crate::selector::StoreBackend;

#[derive(Debug)]
struct Inner {
    records: BTreeMap<RecordId, PresenceRecord>,
    next_id: RecordId,
}

/// In-process record store
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PresenceStore for MemoryStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Memory
    }

    fn migrate(&self) -> Result<()> {
        Ok(())
    }

    fn list(&self) -> Result<Vec<PresenceRecord>> {
        Ok(self.inner.read().records.values().cloned().collect())
    }

    fn get(&self, id: RecordId) -> Result<Option<PresenceRecord>> {
        Ok(self.inner.read().records.get(&id).cloned())
    }

    fn create(&self, new: NewPresence) -> Result<PresenceRecord> {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;

        let record = new.into_record(id, now());
        inner.records.insert(id, record.clone());
        Ok(record)
    }

    fn save(&self, id: RecordId, patch: &PresencePatch) -> Result<Option<PresenceRecord>> {
        let mut inner = self.inner.write();
        Ok(inner.records.get_mut(&id).map(|record| {
            patch.apply(record, now());
            record.clone()
        }))
    }

    fn destroy(&self, id: RecordId) -> Result<bool> {
        Ok(self.inner.write().records.remove(&id).is_some())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.inner.read().records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LineStatus;
    use crate::storage::conformance;
    use proptest::prelude::*;

    #[test]
    fn test_create_assigns_increasing_ids() {
        conformance::create_assigns_increasing_ids(&MemoryStore::new());
    }

    #[test]
    fn test_get_round_trips() {
        conformance::get_round_trips(&MemoryStore::new());
    }

    #[test]
    fn test_list_in_creation_order() {
        conformance::list_in_creation_order(&MemoryStore::new());
    }

    #[test]
    fn test_save_is_partial() {
        conformance::save_is_partial(&MemoryStore::new());
    }

    #[test]
    fn test_destroy_is_permanent() {
        conformance::destroy_is_permanent(&MemoryStore::new());
    }

    #[test]
    fn test_migrate_is_idempotent() {
        conformance::migrate_is_idempotent(&MemoryStore::new());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Create,
        DestroyNth(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => Just(Op::Create),
            1 => any::<usize>().prop_map(Op::DestroyNth),
        ]
    }

    proptest! {
        #[test]
        fn prop_ids_strictly_increase(ops in prop::collection::vec(op(), 1..64)) {
            let store = MemoryStore::new();
            let mut last_id = 0;

            for op in ops {
                match op {
                    Op::Create => {
                        let record = store
                            .create(NewPresence::new("user", LineStatus::Online).unwrap())
                            .unwrap();
                        prop_assert!(record.id > last_id);
                        last_id = record.id;
                    }
                    Op::DestroyNth(n) => {
                        let ids: Vec<RecordId> =
                            store.list().unwrap().iter().map(|r| r.id).collect();
                        if !ids.is_empty() {
                            prop_assert!(store.destroy(ids[n % ids.len()]).unwrap());
                        }
                    }
                }
            }
        }
    }
}
