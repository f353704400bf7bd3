//! Local store trait definition.

use crate::error::StoreResult;
use bizsync_model::{EntityKind, Record};

/// The local embedded store, as seen by sync and import.
///
/// Every operation returns a result instead of reporting through
/// callbacks; implementations use interior mutability so a store can be
/// shared behind `&` across the engine.
///
/// # Invariants
///
/// - `add` fails with `DuplicateId` if the id exists; for singleton kinds
///   it fails if any row exists
/// - `update` fails with `NotFound` if the id does not exist; for singleton
///   kinds it replaces the one stored row whatever its id
/// - `delete` fails with `DeleteUnsupported` for kinds without delete support
/// - `get_all` returns records ordered by id
pub trait LocalStore: Send + Sync {
    /// Returns every record of a kind.
    fn get_all(&self, kind: EntityKind) -> StoreResult<Vec<Record>>;

    /// Returns one record by id.
    fn get(&self, kind: EntityKind, id: &str) -> StoreResult<Option<Record>>;

    /// Inserts a new record.
    fn add(&self, kind: EntityKind, record: Record) -> StoreResult<()>;

    /// Replaces an existing record with the same id.
    fn update(&self, kind: EntityKind, record: Record) -> StoreResult<()>;

    /// Removes a record.
    fn delete(&self, kind: EntityKind, id: &str) -> StoreResult<()>;

    /// Reads a metadata value.
    fn get_meta(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes a metadata value.
    fn set_meta(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Returns the single row of a singleton kind.
    fn get_singleton(&self, kind: EntityKind) -> StoreResult<Option<Record>> {
        Ok(self.get_all(kind)?.into_iter().next())
    }

    /// Applies several mutations of one kind in order.
    ///
    /// Returns one result per op; a failed op leaves the others in place.
    /// Stores that persist on every write override this to commit the
    /// whole batch at once, in which case the outer error means nothing
    /// was committed.
    fn apply_batch(
        &self,
        kind: EntityKind,
        ops: Vec<StoreOp>,
    ) -> StoreResult<Vec<StoreResult<()>>> {
        Ok(ops.into_iter().map(|op| op.apply_to(self, kind)).collect())
    }
}

/// One queued store mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp {
    /// Insert a new record.
    Add(Record),
    /// Replace an existing record.
    Update(Record),
    /// Remove the record with this id.
    Delete(String),
}

impl StoreOp {
    /// Performs this op through the single-record operations of `store`.
    pub fn apply_to<S: LocalStore + ?Sized>(self, store: &S, kind: EntityKind) -> StoreResult<()> {
        match self {
            StoreOp::Add(record) => store.add(kind, record),
            StoreOp::Update(record) => store.update(kind, record),
            StoreOp::Delete(id) => store.delete(kind, &id),
        }
    }
}

impl<S: LocalStore + ?Sized> LocalStore for &S {
    fn get_all(&self, kind: EntityKind) -> StoreResult<Vec<Record>> {
        (**self).get_all(kind)
    }

    fn get(&self, kind: EntityKind, id: &str) -> StoreResult<Option<Record>> {
        (**self).get(kind, id)
    }

    fn add(&self, kind: EntityKind, record: Record) -> StoreResult<()> {
        (**self).add(kind, record)
    }

    fn update(&self, kind: EntityKind, record: Record) -> StoreResult<()> {
        (**self).update(kind, record)
    }

    fn delete(&self, kind: EntityKind, id: &str) -> StoreResult<()> {
        (**self).delete(kind, id)
    }

    fn get_meta(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get_meta(key)
    }

    fn set_meta(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set_meta(key, value)
    }

    fn apply_batch(
        &self,
        kind: EntityKind,
        ops: Vec<StoreOp>,
    ) -> StoreResult<Vec<StoreResult<()>>> {
        (**self).apply_batch(kind, ops)
    }
}

impl<S: LocalStore + ?Sized> LocalStore for std::sync::Arc<S> {
    fn get_all(&self, kind: EntityKind) -> StoreResult<Vec<Record>> {
        (**self).get_all(kind)
    }

    fn get(&self, kind: EntityKind, id: &str) -> StoreResult<Option<Record>> {
        (**self).get(kind, id)
    }

    fn add(&self, kind: EntityKind, record: Record) -> StoreResult<()> {
        (**self).add(kind, record)
    }

    fn update(&self, kind: EntityKind, record: Record) -> StoreResult<()> {
        (**self).update(kind, record)
    }

    fn delete(&self, kind: EntityKind, id: &str) -> StoreResult<()> {
        (**self).delete(kind, id)
    }

    fn get_meta(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get_meta(key)
    }

    fn set_meta(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set_meta(key, value)
    }

    fn apply_batch(
        &self,
        kind: EntityKind,
        ops: Vec<StoreOp>,
    ) -> StoreResult<Vec<StoreResult<()>>> {
        (**self).apply_batch(kind, ops)
    }
}
