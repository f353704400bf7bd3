//! Incremental pull: remote rows into the local store.

use crate::auth::Principal;
use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::remote::{RemoteQuery, RemoteStore};
use bizsync_model::{format_timestamp, EntityKind, FieldMapper, Record};
use bizsync_reconcile::{Conflict, Reconciler};
use bizsync_store::{LocalStore, SyncCursor};
use tracing::{debug, warn};

/// Result of a pull pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullOutcome {
    /// Rows processed (added, updated or skipped).
    pub records_pulled: u64,
    /// Local records overwritten by newer remote ones.
    pub conflicts: Vec<Conflict>,
    /// Per-table and per-row failures.
    pub errors: Vec<String>,
}

/// Pulls remote changes since the cursor, table by table.
pub struct Puller<'a, R: ?Sized, S> {
    remote: &'a R,
    reconciler: Reconciler<&'a S>,
    mapper: &'a FieldMapper,
    config: &'a SyncConfig,
}

impl<'a, R, S> Puller<'a, R, S>
where
    R: RemoteStore + ?Sized,
    S: LocalStore,
{
    /// Creates a puller.
    pub fn new(
        remote: &'a R,
        store: &'a S,
        mapper: &'a FieldMapper,
        config: &'a SyncConfig,
    ) -> Self {
        Self {
            remote,
            reconciler: Reconciler::new(store),
            mapper,
            config,
        }
    }

    /// Builds the query for one kind.
    ///
    /// Kinds without timestamps are always pulled in full.
    pub fn query_for(
        &self,
        kind: EntityKind,
        principal: &Principal,
        cursor: Option<&SyncCursor>,
    ) -> RemoteQuery {
        let query = RemoteQuery::new().eq(
            self.config.owner_column.as_str(),
            principal.user_id.as_str(),
        );
        match cursor {
            Some(cursor) if kind.has_timestamp() => query.gt(
                self.config.updated_at_column.as_str(),
                format_timestamp(cursor.last_sync),
            ),
            _ => query,
        }
    }

    /// Converts a remote row to local shape, dropping transport columns.
    pub fn to_local(&self, mut row: Record) -> Record {
        for column in self.config.transport_columns() {
            row.remove(column);
        }
        self.mapper.to_local_shape(&row)
    }

    /// Pulls every registered table.
    ///
    /// A failed table or row is recorded and the pass moves on.
    pub fn pull(&self, principal: &Principal, cursor: Option<&SyncCursor>) -> PullOutcome {
        let mut outcome = PullOutcome::default();

        for kind in EntityKind::ALL {
            let table = kind.remote_table();
            let query = self.query_for(kind, principal, cursor);

            let rows = match self.remote.query(table, &query) {
                Ok(rows) => rows,
                Err(e) => {
                    warn!(table, error = %e, "pull query failed");
                    outcome.errors.push(format!("pull {table}: {e}"));
                    continue;
                }
            };
            debug!(table, rows = rows.len(), "pulled");

            for row in rows {
                let record = self.to_local(row);
                match self.pull_one(kind, &record) {
                    Ok(conflict) => {
                        outcome.records_pulled += 1;
                        outcome.conflicts.extend(conflict);
                    }
                    Err(e) => {
                        let id = record.id().unwrap_or("<no id>");
                        warn!(table, id, error = %e, "pull apply failed");
                        outcome.errors.push(format!("pull {table} {id}: {e}"));
                    }
                }
            }
        }

        outcome
    }

    fn pull_one(&self, kind: EntityKind, record: &Record) -> SyncResult<Option<Conflict>> {
        let classification = self.reconciler.apply_one(kind, record)?;
        Ok(Conflict::from_classification(&classification))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryRemoteStore;
    use bizsync_store::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn principal() -> Principal {
        Principal::new("u1")
    }

    #[test]
    fn query_includes_cursor_only_for_timestamped_kinds() {
        let remote = MemoryRemoteStore::new();
        let store = MemoryStore::new();
        let mapper = FieldMapper::new();
        let config = SyncConfig::default();
        let puller = Puller::new(&remote, &store, &mapper, &config);
        let cursor = SyncCursor::new(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());

        let query = puller.query_for(EntityKind::Job, &principal(), Some(&cursor));
        assert_eq!(query.filters.len(), 2);

        let query = puller.query_for(EntityKind::JobCategory, &principal(), Some(&cursor));
        assert_eq!(query.filters.len(), 1);

        let query = puller.query_for(EntityKind::Job, &principal(), None);
        assert_eq!(query.filters.len(), 1);
    }

    #[test]
    fn to_local_strips_transport_columns() {
        let remote = MemoryRemoteStore::new();
        let store = MemoryStore::new();
        let mapper = FieldMapper::new();
        let config = SyncConfig::default();
        let puller = Puller::new(&remote, &store, &mapper, &config);

        let local = puller.to_local(
            Record::new()
                .with("id", "L1")
                .with("hourly_rate", 30)
                .with("updated_at", "2024-01-01T00:00:00Z")
                .with("user_id", "u1")
                .with("synced_at", "2024-01-02T00:00:00Z"),
        );
        assert_eq!(
            local,
            Record::new()
                .with("id", "L1")
                .with("hourlyRate", 30)
                .with("updatedAt", "2024-01-01T00:00:00Z")
        );
    }
}
