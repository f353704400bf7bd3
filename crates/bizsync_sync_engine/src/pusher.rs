//! Batched push: local collections to remote tables.

use crate::auth::Principal;
use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::remote::RemoteStore;
use bizsync_model::{format_timestamp, EntityKind, FieldMapper, Record};
use bizsync_store::LocalStore;
use chrono::{DateTime, Utc};
use std::thread;
use tracing::{debug, warn};

/// Result of a push pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushOutcome {
    /// Records in batches the remote accepted.
    pub records_pushed: u64,
    /// Upsert attempts repeated after a retryable failure.
    pub retries: u64,
    /// Per-table and per-batch failures.
    pub errors: Vec<String>,
}

/// Pushes every local collection in fixed-size batches.
pub struct Pusher<'a, R: ?Sized, S: ?Sized> {
    remote: &'a R,
    store: &'a S,
    mapper: &'a FieldMapper,
    config: &'a SyncConfig,
}

impl<'a, R, S> Pusher<'a, R, S>
where
    R: RemoteStore + ?Sized,
    S: LocalStore + ?Sized,
{
    /// Creates a pusher.
    pub fn new(
        remote: &'a R,
        store: &'a S,
        mapper: &'a FieldMapper,
        config: &'a SyncConfig,
    ) -> Self {
        Self {
            remote,
            store,
            mapper,
            config,
        }
    }

    /// Converts a local record to a remote row owned by `principal`.
    pub fn to_remote(&self, record: &Record, principal: &Principal, received_at: &str) -> Record {
        let mut row = self.mapper.to_remote_shape(record);
        row.insert(self.config.owner_column.as_str(), principal.user_id.as_str());
        row.insert(self.config.received_at_column.as_str(), received_at);
        row
    }

    /// Pushes every registered collection.
    ///
    /// Empty collections are skipped. A failed batch is recorded and the
    /// pass moves on to the next batch.
    pub fn push(&self, principal: &Principal, now: DateTime<Utc>) -> PushOutcome {
        let mut outcome = PushOutcome::default();
        let received_at = format_timestamp(now);

        for kind in EntityKind::ALL {
            let table = kind.remote_table();
            let records = match self.store.get_all(kind) {
                Ok(records) => records,
                Err(e) => {
                    warn!(table, error = %e, "push read failed");
                    outcome.errors.push(format!("push {table}: {e}"));
                    continue;
                }
            };
            if records.is_empty() {
                continue;
            }

            let rows: Vec<Record> = records
                .iter()
                .map(|record| self.to_remote(record, principal, &received_at))
                .collect();

            let batch_size = self.config.push_batch_size.max(1);
            for (index, batch) in rows.chunks(batch_size).enumerate() {
                match self.upsert_with_retry(table, batch) {
                    Ok(retried) => {
                        outcome.records_pushed += batch.len() as u64;
                        outcome.retries += retried;
                        debug!(table, batch = index, rows = batch.len(), "pushed");
                    }
                    Err(e) => {
                        warn!(table, batch = index, error = %e, "push batch failed");
                        outcome.errors.push(format!("push {table} batch {index}: {e}"));
                    }
                }
            }
        }

        outcome
    }

    /// Upserts one batch, retrying retryable failures; returns retry count.
    fn upsert_with_retry(&self, table: &str, batch: &[Record]) -> SyncResult<u64> {
        let retry = &self.config.retry;
        let mut attempt = 0;
        loop {
            let delay = retry.delay_for_attempt(attempt);
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            match self.remote.upsert(table, batch) {
                Ok(()) => return Ok(u64::from(attempt)),
                Err(e) if e.is_retryable() && attempt + 1 < retry.max_attempts => {
                    debug!(table, attempt, error = %e, "retrying batch");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use crate::remote::MemoryRemoteStore;
    use bizsync_store::MemoryStore;
    use serde_json::Value;
    use std::time::Duration;

    fn job(id: &str) -> Record {
        Record::new()
            .with("id", id)
            .with("squareFeet", 400)
            .with("legacyMarkup", 1.2)
            .with("updatedAt", "2024-01-01T00:00:00Z")
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_717_200_000, 0).unwrap()
    }

    fn fast_retry(attempts: u32) -> RetryConfig {
        RetryConfig::new(attempts)
            .with_initial_delay(Duration::ZERO)
            .with_jitter(false)
    }

    #[test]
    fn rows_are_renamed_and_owned() {
        let remote = MemoryRemoteStore::new();
        let store = MemoryStore::new();
        store.add(EntityKind::Job, job("J1")).unwrap();
        let mapper = FieldMapper::new();
        let config = SyncConfig::default();

        let outcome = Pusher::new(&remote, &store, &mapper, &config).push(&Principal::new("u1"), now());
        assert_eq!(outcome.records_pushed, 1);

        let row = remote.row("jobs", "J1").unwrap();
        assert_eq!(row.get("square_feet"), Some(&Value::from(400)));
        assert_eq!(row.get("user_id"), Some(&Value::from("u1")));
        assert!(row.get("synced_at").is_some());
        assert!(row.get("legacyMarkup").is_none());
        assert!(row.get("legacy_markup").is_none());
    }

    #[test]
    fn batches_split_by_size() {
        let remote = MemoryRemoteStore::new();
        let store = MemoryStore::new();
        for i in 0..5 {
            store.add(EntityKind::Job, job(&format!("J{i}"))).unwrap();
        }
        let mapper = FieldMapper::new();
        let config = SyncConfig::default().with_push_batch_size(2);

        let outcome = Pusher::new(&remote, &store, &mapper, &config).push(&Principal::new("u1"), now());
        assert_eq!(outcome.records_pushed, 5);
        let sizes: Vec<usize> = remote.upsert_batches().into_iter().map(|(_, n)| n).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn failed_batch_does_not_block_others() {
        let remote = MemoryRemoteStore::new();
        let store = MemoryStore::new();
        for i in 0..3 {
            store.add(EntityKind::Job, job(&format!("J{i}"))).unwrap();
        }
        store
            .add(EntityKind::System, Record::new().with("id", "S1"))
            .unwrap();
        remote.fail_upserts("jobs", 1, false);
        let mapper = FieldMapper::new();
        let config = SyncConfig::default()
            .with_push_batch_size(2)
            .with_retry(RetryConfig::no_retry());

        let outcome = Pusher::new(&remote, &store, &mapper, &config).push(&Principal::new("u1"), now());
        assert_eq!(outcome.records_pushed, 2);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("push jobs batch 0"));
        assert_eq!(remote.rows("jobs").len(), 1);
        assert_eq!(remote.rows("systems").len(), 1);
    }

    #[test]
    fn retryable_failure_is_retried() {
        let remote = MemoryRemoteStore::new();
        let store = MemoryStore::new();
        store.add(EntityKind::Job, job("J1")).unwrap();
        remote.fail_upserts("jobs", 2, true);
        let mapper = FieldMapper::new();
        let config = SyncConfig::default().with_retry(fast_retry(3));

        let outcome = Pusher::new(&remote, &store, &mapper, &config).push(&Principal::new("u1"), now());
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.records_pushed, 1);
        assert_eq!(outcome.retries, 2);
    }

    #[test]
    fn retries_are_bounded() {
        let remote = MemoryRemoteStore::new();
        let store = MemoryStore::new();
        store.add(EntityKind::Job, job("J1")).unwrap();
        remote.fail_upserts("jobs", 5, true);
        let mapper = FieldMapper::new();
        let config = SyncConfig::default().with_retry(fast_retry(3));

        let outcome = Pusher::new(&remote, &store, &mapper, &config).push(&Principal::new("u1"), now());
        assert_eq!(outcome.records_pushed, 0);
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn empty_collections_are_skipped() {
        let remote = MemoryRemoteStore::new();
        let store = MemoryStore::new();
        let mapper = FieldMapper::new();
        let config = SyncConfig::default();

        let outcome = Pusher::new(&remote, &store, &mapper, &config).push(&Principal::new("u1"), now());
        assert_eq!(outcome, PushOutcome::default());
        assert!(remote.upsert_batches().is_empty());
    }
}
