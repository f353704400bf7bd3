//! The export bundle.
//!
//! On disk a bundle is one JSON document:
//!
//! ```text
//! {
//!   "metadata": { "version": 1, "exportedAt": "...", "appName": "bizsync" },
//!   "systems": [ ... ],
//!   "jobs": [ ... ],
//!   ...
//!   "costSettings": { ... } | null,
//!   "inventory": { ... } | null
//! }
//! ```
//!
//! Collections are arrays; singletons are a single object or `null`.

use crate::error::TransferResult;
use bizsync_model::{EntityKind, Record};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Current bundle format version.
pub const EXPORT_VERSION: u32 = 1;

/// Key of the metadata object.
pub const METADATA_KEY: &str = "metadata";

/// Compatibility header of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetadata {
    /// Format version.
    pub version: u32,
    /// When the bundle was produced.
    pub exported_at: String,
    /// Product identifier.
    pub app_name: String,
}

/// A full snapshot of the local store.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportBundle {
    metadata: BundleMetadata,
    collections: Vec<(EntityKind, Vec<Record>)>,
}

impl ExportBundle {
    pub(crate) fn new(metadata: BundleMetadata, collections: Vec<(EntityKind, Vec<Record>)>) -> Self {
        Self {
            metadata,
            collections,
        }
    }

    /// Returns the metadata.
    pub fn metadata(&self) -> &BundleMetadata {
        &self.metadata
    }

    /// Returns the records of one kind.
    pub fn records(&self, kind: EntityKind) -> &[Record] {
        self.collections
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, records)| records.as_slice())
            .unwrap_or(&[])
    }

    /// Total number of records.
    pub fn record_count(&self) -> usize {
        self.collections.iter().map(|(_, records)| records.len()).sum()
    }

    /// Converts to a JSON value.
    pub fn to_value(&self) -> TransferResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json_string_pretty(&self) -> TransferResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the bundle to a file, creating parent directories.
    pub fn write_to(&self, path: &Path) -> TransferResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_json_string_pretty()?)?;
        Ok(())
    }
}

impl Serialize for ExportBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.collections.len() + 1))?;
        map.serialize_entry(METADATA_KEY, &self.metadata)?;
        for (kind, records) in &self.collections {
            if kind.is_singleton() {
                map.serialize_entry(kind.local_collection(), &records.first())?;
            } else {
                map.serialize_entry(kind.local_collection(), records)?;
            }
        }
        map.end()
    }
}

/// Reads an untrusted bundle file as raw JSON.
///
/// The result must go through [`crate::ValidatedBundle::parse`] before use.
pub fn read_bundle(path: &Path) -> TransferResult<Value> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bundle() -> ExportBundle {
        ExportBundle::new(
            BundleMetadata {
                version: EXPORT_VERSION,
                exported_at: "2024-06-01T00:00:00.000Z".into(),
                app_name: "bizsync".into(),
            },
            vec![
                (EntityKind::Job, vec![Record::new().with("id", "J1")]),
                (EntityKind::CostSettings, vec![Record::new().with("id", "settings")]),
                (EntityKind::Inventory, vec![]),
            ],
        )
    }

    #[test]
    fn bundle_shape() {
        assert_eq!(
            bundle().to_value().unwrap(),
            json!({
                "metadata": {
                    "version": 1,
                    "exportedAt": "2024-06-01T00:00:00.000Z",
                    "appName": "bizsync"
                },
                "jobs": [{"id": "J1"}],
                "costSettings": {"id": "settings"},
                "inventory": null
            })
        );
    }

    #[test]
    fn write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("bundle.json");
        let bundle = bundle();
        bundle.write_to(&path).unwrap();
        assert_eq!(read_bundle(&path).unwrap(), bundle.to_value().unwrap());
    }

    #[test]
    fn records_by_kind() {
        let bundle = bundle();
        assert_eq!(bundle.records(EntityKind::Job).len(), 1);
        assert!(bundle.records(EntityKind::System).is_empty());
        assert_eq!(bundle.record_count(), 2);
    }
}
