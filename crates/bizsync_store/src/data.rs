//! In-memory dataset shared by every store implementation.

use crate::error::{StoreError, StoreResult};
use crate::store::StoreOp;
use bizsync_model::{EntityKind, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All collections plus metadata, serialized as one document by `FileStore`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Dataset {
    /// Local collection name → id → record.
    #[serde(default)]
    pub collections: BTreeMap<String, BTreeMap<String, Record>>,
    /// Key-value metadata (sync cursor lives here).
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl Dataset {
    fn rows(&self, kind: EntityKind) -> Option<&BTreeMap<String, Record>> {
        self.collections.get(kind.local_collection())
    }

    fn rows_mut(&mut self, kind: EntityKind) -> &mut BTreeMap<String, Record> {
        self.collections
            .entry(kind.local_collection().to_string())
            .or_default()
    }

    pub fn get_all(&self, kind: EntityKind) -> Vec<Record> {
        self.rows(kind)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn get(&self, kind: EntityKind, id: &str) -> Option<Record> {
        self.rows(kind).and_then(|rows| rows.get(id)).cloned()
    }

    pub fn add(&mut self, kind: EntityKind, record: Record) -> StoreResult<()> {
        let id = record.require_id(kind)?.to_string();
        let rows = self.rows_mut(kind);
        let occupied = if kind.is_singleton() {
            !rows.is_empty()
        } else {
            rows.contains_key(&id)
        };
        if occupied {
            return Err(StoreError::DuplicateId {
                kind: kind.label().to_string(),
                id,
            });
        }
        rows.insert(id, record);
        Ok(())
    }

    pub fn update(&mut self, kind: EntityKind, record: Record) -> StoreResult<()> {
        let id = record.require_id(kind)?.to_string();
        let rows = self.rows_mut(kind);
        // A singleton's one row is replaced even when the id changes.
        if kind.is_singleton() && !rows.is_empty() {
            rows.clear();
            rows.insert(id, record);
            return Ok(());
        }
        match rows.get_mut(&id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(StoreError::NotFound {
                kind: kind.label().to_string(),
                id,
            }),
        }
    }

    pub fn delete(&mut self, kind: EntityKind, id: &str) -> StoreResult<()> {
        if !kind.supports_delete() {
            return Err(StoreError::DeleteUnsupported {
                kind: kind.label().to_string(),
            });
        }
        match self.rows_mut(kind).remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                kind: kind.label().to_string(),
                id: id.to_string(),
            }),
        }
    }

    pub fn apply(&mut self, kind: EntityKind, op: StoreOp) -> StoreResult<()> {
        match op {
            StoreOp::Add(record) => self.add(kind, record),
            StoreOp::Update(record) => self.update(kind, record),
            StoreOp::Delete(id) => self.delete(kind, &id),
        }
    }

    /// Rejects documents whose collection names or row keys are inconsistent.
    pub fn check(&self) -> StoreResult<()> {
        for (collection, rows) in &self.collections {
            let kind = bizsync_model::registry::kind_for_collection(collection)
                .map_err(|e| StoreError::Corrupted(e.to_string()))?;
            if kind.is_singleton() && rows.len() > 1 {
                return Err(StoreError::Corrupted(format!(
                    "singleton collection {collection} holds {} rows",
                    rows.len()
                )));
            }
            for (key, record) in rows {
                if record.id() != Some(key.as_str()) {
                    return Err(StoreError::Corrupted(format!(
                        "{collection}: row key {key} does not match record id"
                    )));
                }
            }
        }
        Ok(())
    }
}
