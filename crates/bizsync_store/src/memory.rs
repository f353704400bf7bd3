//! In-memory local store for testing.

use crate::data::Dataset;
use crate::error::StoreResult;
use crate::store::LocalStore;
use bizsync_model::{EntityKind, Record};
use parking_lot::RwLock;

/// An in-memory local store.
///
/// Suitable for unit tests, integration tests and dry runs that must not
/// touch disk.
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Dataset>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all kinds.
    pub fn record_count(&self) -> usize {
        self.data.read().collections.values().map(|rows| rows.len()).sum()
    }

    /// Removes every record and metadata entry.
    pub fn clear(&self) {
        *self.data.write() = Dataset::default();
    }
}

impl LocalStore for MemoryStore {
    fn get_all(&self, kind: EntityKind) -> StoreResult<Vec<Record>> {
        Ok(self.data.read().get_all(kind))
    }

    fn get(&self, kind: EntityKind, id: &str) -> StoreResult<Option<Record>> {
        Ok(self.data.read().get(kind, id))
    }

    fn add(&self, kind: EntityKind, record: Record) -> StoreResult<()> {
        self.data.write().add(kind, record)
    }

    fn update(&self, kind: EntityKind, record: Record) -> StoreResult<()> {
        self.data.write().update(kind, record)
    }

    fn delete(&self, kind: EntityKind, id: &str) -> StoreResult<()> {
        self.data.write().delete(kind, id)
    }

    fn get_meta(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.data.read().meta.get(key).cloned())
    }

    fn set_meta(&self, key: &str, value: &str) -> StoreResult<()> {
        self.data
            .write()
            .meta
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn memory_new_is_empty() {
        let store = MemoryStore::new();
        assert_eq!(store.record_count(), 0);
        assert!(store.get_all(EntityKind::System).unwrap().is_empty());
        assert!(store.get_singleton(EntityKind::Inventory).unwrap().is_none());
    }

    #[test]
    fn memory_crud() {
        let store = MemoryStore::new();
        let laborer = Record::new().with("id", "L1").with("name", "Ana");
        store.add(EntityKind::Laborer, laborer).unwrap();

        let updated = Record::new().with("id", "L1").with("name", "Ana María");
        store.update(EntityKind::Laborer, updated.clone()).unwrap();
        assert_eq!(store.get(EntityKind::Laborer, "L1").unwrap(), Some(updated));

        store.delete(EntityKind::Laborer, "L1").unwrap();
        assert!(store.get(EntityKind::Laborer, "L1").unwrap().is_none());
    }

    #[test]
    fn memory_update_missing_fails() {
        let store = MemoryStore::new();
        let err = store
            .update(EntityKind::Job, Record::new().with("id", "J404"))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn memory_add_without_id_fails() {
        let store = MemoryStore::new();
        let err = store
            .add(EntityKind::Job, Record::new().with("name", "nameless"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Model(_)));
    }

    #[test]
    fn memory_get_all_sorted_by_id() {
        let store = MemoryStore::new();
        for id in ["S3", "S1", "S2"] {
            store
                .add(EntityKind::System, Record::new().with("id", id))
                .unwrap();
        }
        let ids: Vec<String> = store
            .get_all(EntityKind::System)
            .unwrap()
            .iter()
            .map(|r| r.id().unwrap().to_string())
            .collect();
        assert_eq!(ids, ["S1", "S2", "S3"]);
    }

    #[test]
    fn memory_meta() {
        let store = MemoryStore::new();
        assert_eq!(store.get_meta("k").unwrap(), None);
        store.set_meta("k", "v").unwrap();
        assert_eq!(store.get_meta("k").unwrap().as_deref(), Some("v"));
        store.clear();
        assert_eq!(store.get_meta("k").unwrap(), None);
    }
}
