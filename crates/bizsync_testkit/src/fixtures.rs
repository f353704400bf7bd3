//! Record builders, sample data and store helpers.

use bizsync_model::{EntityKind, Record};
use bizsync_store::{FileStore, LocalStore, MemoryStore};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builds a `System`.
pub fn system(id: &str, name: &str, updated_at: &str) -> Record {
    Record::new()
        .with("id", id)
        .with("name", name)
        .with("updatedAt", updated_at)
        .with("basePrice", 4.5)
}

/// Builds a `Job` with status `Pending`.
pub fn job(id: &str, name: &str, updated_at: &str) -> Record {
    Record::new()
        .with("id", id)
        .with("name", name)
        .with("status", "Pending")
        .with("updatedAt", updated_at)
        .with("price", 1200)
}

/// Builds a `Laborer`.
pub fn laborer(id: &str, name: &str, updated_at: &str) -> Record {
    Record::new()
        .with("id", id)
        .with("name", name)
        .with("hourlyRate", 28.5)
        .with("updatedAt", updated_at)
        .with("active", true)
}

/// Builds a `Material`.
pub fn material(id: &str, name: &str, updated_at: &str) -> Record {
    Record::new()
        .with("id", id)
        .with("name", name)
        .with("unitCost", 12.75)
        .with("updatedAt", updated_at)
        .with("unit", "gal")
}

/// Builds a `JobCategory` (no timestamp).
pub fn job_category(id: &str, name: &str) -> Record {
    Record::new().with("id", id).with("name", name)
}

/// Builds the `CostSettings` singleton.
pub fn cost_settings(id: &str, updated_at: &str) -> Record {
    Record::new()
        .with("id", id)
        .with("updatedAt", updated_at)
        .with("overheadPercent", 15)
        .with("targetMarginPercent", 35)
}

/// Builds the `Inventory` singleton.
pub fn inventory(id: &str, updated_at: &str) -> Record {
    Record::new()
        .with("id", id)
        .with("updatedAt", updated_at)
        .with("totalValue", 5400.0)
        .with("itemCount", 42)
}

/// Builds a valid record of any kind.
pub fn record(kind: EntityKind, id: &str, updated_at: &str) -> Record {
    let name = format!("{} {id}", kind.label());
    match kind {
        EntityKind::System => system(id, &name, updated_at),
        EntityKind::Job => job(id, &name, updated_at),
        EntityKind::Laborer => laborer(id, &name, updated_at),
        EntityKind::Material => material(id, &name, updated_at),
        EntityKind::JobCategory => job_category(id, &name),
        EntityKind::CostSettings => cost_settings(id, updated_at),
        EntityKind::Inventory => inventory(id, updated_at),
    }
}

/// A small dataset touching every kind, in registry order.
pub fn sample_dataset() -> Vec<(EntityKind, Vec<Record>)> {
    let ts = "2024-06-01T00:00:00.000Z";
    vec![
        (
            EntityKind::System,
            vec![system("S1", "Epoxy Flake", ts), system("S2", "Metallic", ts)],
        ),
        (
            EntityKind::Job,
            vec![
                job("J1", "Garage - Smith", ts).with("systemId", "S1"),
                job("J2", "Basement - Lee", ts).with("status", "Won"),
            ],
        ),
        (
            EntityKind::Laborer,
            vec![laborer("L1", "Ana", ts), laborer("L2", "Ben", ts)],
        ),
        (EntityKind::Material, vec![material("M1", "Primer", ts)]),
        (
            EntityKind::JobCategory,
            vec![job_category("C1", "Residential")],
        ),
        (EntityKind::CostSettings, vec![cost_settings("settings", ts)]),
        (EntityKind::Inventory, vec![inventory("inventory", ts)]),
    ]
}

/// Adds every record of a dataset to a store.
///
/// # Panics
///
/// Panics if the store rejects a record.
pub fn seed<S: LocalStore + ?Sized>(store: &S, dataset: &[(EntityKind, Vec<Record>)]) {
    for (kind, records) in dataset {
        for record in records {
            store
                .add(*kind, record.clone())
                .expect("Failed to seed record");
        }
    }
}

/// A store holding [`sample_dataset`].
pub fn sample_store() -> MemoryStore {
    let store = MemoryStore::new();
    seed(&store, &sample_dataset());
    store
}

/// Runs a test with a store holding [`sample_dataset`].
pub fn with_sample_store<F, R>(f: F) -> R
where
    F: FnOnce(&MemoryStore) -> R,
{
    let store = sample_store();
    f(&store)
}

/// A file store in a temporary directory with automatic cleanup.
pub struct TestFileStore {
    /// The store instance.
    pub store: FileStore,
    /// Kept alive to prevent cleanup.
    _temp_dir: TempDir,
}

impl TestFileStore {
    /// Creates an empty file store.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::open(&temp_dir.path().join("store.json"))
            .expect("Failed to open file store");
        Self {
            store,
            _temp_dir: temp_dir,
        }
    }

    /// Directory the store lives in.
    pub fn dir(&self) -> &Path {
        self._temp_dir.path()
    }

    /// Path of the store document.
    pub fn path(&self) -> PathBuf {
        self.store.path().to_path_buf()
    }
}

impl Default for TestFileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestFileStore {
    type Target = FileStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Field-by-field snapshot of a store, for equality checks.
pub fn snapshot<S: LocalStore + ?Sized>(store: &S) -> Vec<(EntityKind, Vec<Record>)> {
    EntityKind::ALL
        .into_iter()
        .map(|kind| (kind, store.get_all(kind).expect("Failed to read store")))
        .collect()
}
