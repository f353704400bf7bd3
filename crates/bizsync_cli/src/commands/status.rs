//! Status command.

use bizsync_model::format_timestamp;
use bizsync_store::{FileStore, SyncCursor};
use bizsync_sync_engine::PendingChanges;
use serde::Serialize;
use std::path::Path;

/// Sync status of a store.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResult {
    /// Store path.
    pub path: String,
    /// Last sync time, if the store was ever synced.
    pub last_sync: Option<String>,
    /// Records modified since the last sync.
    pub pending: PendingChanges,
}

/// Runs the status command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = status(path)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn status(path: &Path) -> Result<StatusResult, Box<dyn std::error::Error>> {
    let store = FileStore::open(path)?;
    let cursor = SyncCursor::load(&store)?;
    let pending = PendingChanges::scan(&store, cursor.as_ref())?;

    Ok(StatusResult {
        path: path.display().to_string(),
        last_sync: cursor.map(|c| format_timestamp(c.last_sync)),
        pending,
    })
}

fn print_text_output(result: &StatusResult) {
    println!("Store: {}", result.path);
    match &result.last_sync {
        Some(ts) => println!("Last sync: {ts}"),
        None => println!("Last sync: never"),
    }
    if result.pending.has_pending() {
        println!("Pending changes: {}", result.pending.total());
        for (kind, count) in &result.pending.per_kind {
            println!("  {:<16} {}", kind.local_collection(), count);
        }
    } else {
        println!("✓ No pending changes");
    }
}
