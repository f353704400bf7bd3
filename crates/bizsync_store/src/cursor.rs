//! Persisted sync cursor.

use crate::error::{StoreError, StoreResult};
use crate::store::LocalStore;
use bizsync_model::{format_timestamp, parse_timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata key under which the cursor is stored.
pub const CURSOR_KEY: &str = "syncCursor";

/// The last-synced timestamp bounding incremental pulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCursor {
    /// Start time of the last completed sync cycle.
    pub last_sync: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCursor {
    last_sync: String,
}

impl SyncCursor {
    /// Creates a cursor.
    pub fn new(last_sync: DateTime<Utc>) -> Self {
        Self { last_sync }
    }

    /// Loads the cursor; `None` before the first sync.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupted`] if a stored value cannot be parsed.
    pub fn load(store: &dyn LocalStore) -> StoreResult<Option<Self>> {
        let Some(raw) = store.get_meta(CURSOR_KEY)? else {
            return Ok(None);
        };
        let stored: StoredCursor = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Corrupted(format!("sync cursor: {e}")))?;
        let last_sync = parse_timestamp(&stored.last_sync).ok_or_else(|| {
            StoreError::Corrupted(format!("sync cursor timestamp {:?}", stored.last_sync))
        })?;
        Ok(Some(Self { last_sync }))
    }

    /// Overwrites the stored cursor.
    pub fn save(&self, store: &dyn LocalStore) -> StoreResult<()> {
        let stored = StoredCursor {
            last_sync: format_timestamp(self.last_sync),
        };
        store.set_meta(CURSOR_KEY, &serde_json::to_string(&stored)?)
    }
}
