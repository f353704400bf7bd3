//! File-backed local store.
//!
//! The whole dataset lives in one JSON document:
//!
//! ```text
//! <store>.json       # collections + metadata
//! <store>.json.tmp   # scratch file for atomic replacement
//! <store>.lock       # advisory lock for single-writer
//! ```
//!
//! Every mutation rewrites the document through the scratch file and an
//! atomic rename, so a crash leaves either the old or the new dataset.
//! A single write therefore costs a full rewrite; bulk callers go through
//! [`LocalStore::apply_batch`], which rewrites once per batch.

use crate::data::Dataset;
use crate::error::{StoreError, StoreResult};
use crate::store::{LocalStore, StoreOp};
use bizsync_model::{EntityKind, Record};
use fs2::FileExt;
use parking_lot::RwLock;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A persistent local store backed by a single JSON file.
///
/// # Thread Safety
///
/// The store holds an exclusive advisory lock on `<store>.lock` for its
/// lifetime; a second `open` of the same path fails with
/// [`StoreError::Locked`]. Within the process, access is serialized by an
/// internal lock.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: RwLock<Dataset>,
    _lock_file: File,
}

impl FileStore {
    /// Opens or creates a store at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Another process holds the lock (`Locked`)
    /// - The existing document cannot be parsed or is inconsistent (`Corrupted`)
    /// - I/O errors occur
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.with_extension("lock"))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked);
        }

        let data = match fs::read(path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Dataset::default(),
            Ok(bytes) => {
                let data: Dataset = serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::Corrupted(format!("{}: {e}", path.display())))?;
                data.check()?;
                data
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Dataset::default(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), "opened file store");

        Ok(Self {
            path: path.to_path_buf(),
            data: RwLock::new(data),
            _lock_file: lock_file,
        })
    }

    /// Returns the path of the store document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn persist(&self, data: &Dataset) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(data)?;
        let temp = self.temp_path();
        {
            let mut file = File::create(&temp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    /// Applies a mutation to a copy and commits it only once it is on disk.
    fn mutate<F>(&self, f: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Dataset) -> StoreResult<()>,
    {
        let mut data = self.data.write();
        let mut next = data.clone();
        f(&mut next)?;
        self.persist(&next)?;
        *data = next;
        Ok(())
    }
}

impl LocalStore for FileStore {
    fn get_all(&self, kind: EntityKind) -> StoreResult<Vec<Record>> {
        Ok(self.data.read().get_all(kind))
    }

    fn get(&self, kind: EntityKind, id: &str) -> StoreResult<Option<Record>> {
        Ok(self.data.read().get(kind, id))
    }

    fn add(&self, kind: EntityKind, record: Record) -> StoreResult<()> {
        self.mutate(|data| data.add(kind, record))
    }

    fn update(&self, kind: EntityKind, record: Record) -> StoreResult<()> {
        self.mutate(|data| data.update(kind, record))
    }

    fn delete(&self, kind: EntityKind, id: &str) -> StoreResult<()> {
        self.mutate(|data| data.delete(kind, id))
    }

    fn get_meta(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.data.read().meta.get(key).cloned())
    }

    fn set_meta(&self, key: &str, value: &str) -> StoreResult<()> {
        self.mutate(|data| {
            data.meta.insert(key.to_string(), value.to_string());
            Ok(())
        })
    }

    fn apply_batch(
        &self,
        kind: EntityKind,
        ops: Vec<StoreOp>,
    ) -> StoreResult<Vec<StoreResult<()>>> {
        let mut results = Vec::with_capacity(ops.len());
        self.mutate(|data| {
            results.extend(ops.into_iter().map(|op| data.apply(kind, op)));
            Ok(())
        })?;
        debug!(kind = %kind, ops = results.len(), "committed batch");
        Ok(results)
    }
}
