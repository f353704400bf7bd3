//! Snapshotting the local store.

use crate::bundle::{BundleMetadata, ExportBundle, EXPORT_VERSION};
use crate::error::TransferResult;
use bizsync_model::{format_timestamp, EntityKind, APP_NAME};
use bizsync_store::LocalStore;
use chrono::{DateTime, Utc};
use tracing::info;

/// Produces export bundles from a local store.
#[derive(Debug)]
pub struct Exporter<S> {
    store: S,
}

impl<S: LocalStore> Exporter<S> {
    /// Creates an exporter over a store.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Snapshots every registered kind, stamped with the current time.
    pub fn export(&self) -> TransferResult<ExportBundle> {
        self.export_at(Utc::now())
    }

    /// Snapshots every registered kind, stamped with `exported_at`.
    ///
    /// Kinds are read in registry order. A read failure aborts the export;
    /// a partial snapshot is never returned.
    pub fn export_at(&self, exported_at: DateTime<Utc>) -> TransferResult<ExportBundle> {
        let mut collections = Vec::with_capacity(EntityKind::ALL.len());
        for kind in EntityKind::ALL {
            collections.push((kind, self.store.get_all(kind)?));
        }

        let bundle = ExportBundle::new(
            BundleMetadata {
                version: EXPORT_VERSION,
                exported_at: format_timestamp(exported_at),
                app_name: APP_NAME.to_string(),
            },
            collections,
        );
        info!(records = bundle.record_count(), "exported");
        Ok(bundle)
    }
}
