//! Integration tests: two devices syncing through one remote.

use bizsync_model::{EntityKind, Record};
use bizsync_store::{LocalStore, MemoryStore, SyncCursor};
use bizsync_sync_engine::{
    MemoryRemoteStore, RetryConfig, StaticAuth, SyncConfig, SyncEngine, SyncState,
};
use bizsync_testkit::prelude::*;
use serde_json::Value;
use std::sync::Arc;

type Device = SyncEngine<Arc<MemoryRemoteStore>, MemoryStore, StaticAuth>;

fn device(remote: &Arc<MemoryRemoteStore>, store: MemoryStore, user: &str) -> Device {
    SyncEngine::new(
        SyncConfig::default().with_retry(RetryConfig::no_retry()),
        Arc::clone(remote),
        store,
        StaticAuth::signed_in(user),
    )
}

#[test]
fn second_device_receives_first_devices_data() {
    let remote = Arc::new(MemoryRemoteStore::new());
    let a = device(&remote, sample_store(), "u1");
    let b = device(&remote, MemoryStore::new(), "u1");

    let pushed = a.sync().unwrap();
    assert!(pushed.success, "{:?}", pushed.errors);
    assert_eq!(pushed.records_pulled, 0);
    assert_eq!(pushed.records_pushed, 10);

    let pulled = b.sync().unwrap();
    assert!(pulled.success, "{:?}", pulled.errors);
    assert_eq!(pulled.records_pulled, 10);
    assert_eq!(pulled.conflicts, 0);
    assert_eq!(snapshot(b.store()), snapshot(a.store()));
}

#[test]
fn remote_rows_are_owned_and_snake_cased() {
    let remote = Arc::new(MemoryRemoteStore::new());
    let a = device(&remote, sample_store(), "u1");
    a.sync().unwrap();

    let row = remote.row("laborers", "L1").unwrap();
    assert_eq!(row.get("user_id"), Some(&Value::from("u1")));
    assert!(row.get("hourly_rate").is_some());
    assert!(row.get("hourlyRate").is_none());
    assert_eq!(remote.rows("inventory_summary").len(), 1);
    assert_eq!(remote.rows("job_categories").len(), 1);
}

#[test]
fn other_owners_rows_are_not_pulled() {
    let remote = Arc::new(MemoryRemoteStore::new());
    device(&remote, sample_store(), "someone-else").sync().unwrap();

    let b = device(&remote, MemoryStore::new(), "u1");
    let result = b.sync().unwrap();
    assert_eq!(result.records_pulled, 0);
    assert_eq!(b.store().record_count(), 0);
}

#[test]
fn newer_remote_overwrites_and_counts_conflict() {
    let remote = Arc::new(MemoryRemoteStore::new());
    let a = device(&remote, sample_store(), "u1");
    let b = device(&remote, sample_store(), "u1");
    a.sync().unwrap();
    b.sync().unwrap();

    let edited = job("J1", "Garage - Smith (revised)", "2099-01-01T00:00:00.000Z");
    a.store().update(EntityKind::Job, edited.clone()).unwrap();
    a.sync().unwrap();

    let result = b.sync().unwrap();
    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.conflicts, 1);
    assert_eq!(result.conflict_details[0].id, "J1");
    assert_eq!(
        result.conflict_details[0].local_updated_at.as_deref(),
        Some("2024-06-01T00:00:00.000Z")
    );
    assert_eq!(b.store().get(EntityKind::Job, "J1").unwrap(), Some(edited));
}

#[test]
fn equal_timestamps_keep_local_and_are_not_conflicts() {
    let remote = Arc::new(MemoryRemoteStore::new());
    device(&remote, sample_store(), "u1").sync().unwrap();

    let local = MemoryStore::new();
    let mine = system("S1", "My local name", "2024-06-01T00:00:00.000Z");
    local.add(EntityKind::System, mine.clone()).unwrap();
    let b = device(&remote, local, "u1");

    let result = b.sync().unwrap();
    assert_eq!(result.conflicts, 0);
    assert_eq!(b.store().get(EntityKind::System, "S1").unwrap(), Some(mine));
}

#[test]
fn older_remote_settings_under_another_id_keep_local() {
    let remote = Arc::new(MemoryRemoteStore::new());
    let other = MemoryStore::new();
    other
        .add(
            EntityKind::CostSettings,
            cost_settings("cs-A", "2024-01-01T00:00:00.000Z"),
        )
        .unwrap();
    device(&remote, other, "u1").sync().unwrap();

    let local = MemoryStore::new();
    let mine = cost_settings("cs-B", "2024-09-01T00:00:00.000Z");
    local.add(EntityKind::CostSettings, mine.clone()).unwrap();
    let b = device(&remote, local, "u1");

    let result = b.sync().unwrap();
    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.conflicts, 0);
    assert_eq!(b.store().get_all(EntityKind::CostSettings).unwrap(), vec![mine]);
}

#[test]
fn newer_remote_settings_under_another_id_replace_local() {
    let remote = Arc::new(MemoryRemoteStore::new());
    let other = MemoryStore::new();
    let theirs = cost_settings("cs-A", "2024-10-01T00:00:00.000Z");
    other.add(EntityKind::CostSettings, theirs.clone()).unwrap();
    device(&remote, other, "u1").sync().unwrap();

    let local = MemoryStore::new();
    local
        .add(
            EntityKind::CostSettings,
            cost_settings("cs-B", "2024-09-01T00:00:00.000Z"),
        )
        .unwrap();
    let b = device(&remote, local, "u1");

    let result = b.sync().unwrap();
    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.conflicts, 1);
    assert_eq!(result.conflict_details[0].id, "cs-A");
    assert_eq!(
        result.conflict_details[0].local_updated_at.as_deref(),
        Some("2024-09-01T00:00:00.000Z")
    );
    assert_eq!(b.store().get_all(EntityKind::CostSettings).unwrap(), vec![theirs]);
}

#[test]
fn cursor_bounds_the_next_pull() {
    let remote = Arc::new(MemoryRemoteStore::new());
    device(&remote, sample_store(), "u1").sync().unwrap();

    let b = device(&remote, MemoryStore::new(), "u1");
    assert_eq!(b.sync().unwrap().records_pulled, 10);

    // Only kinds without timestamps are re-read in full.
    let again = b.sync().unwrap();
    assert_eq!(again.records_pulled, 1);
    assert_eq!(again.conflicts, 0);
}

#[test]
fn missing_principal_touches_nothing() {
    let remote = Arc::new(MemoryRemoteStore::new());
    remote.insert_row(
        "jobs",
        Record::new()
            .with("id", "J7")
            .with("user_id", "u1")
            .with("updated_at", "2024-01-01T00:00:00Z"),
    );
    let a = SyncEngine::new(
        SyncConfig::default(),
        Arc::clone(&remote),
        sample_store(),
        StaticAuth::signed_out(),
    );

    let result = a.sync().unwrap();
    assert!(!result.success);
    assert_eq!(result.errors.len(), 2);
    assert!(result.errors[0].contains("not authenticated"));
    assert_eq!(result.records_pulled + result.records_pushed, 0);
    assert!(remote.upsert_batches().is_empty());
    assert!(a.store().get(EntityKind::Job, "J7").unwrap().is_none());
    assert_eq!(a.state(), SyncState::Error);
    assert!(a.cursor().unwrap().is_some());
}

#[test]
fn failed_table_does_not_stop_the_cycle() {
    let remote = Arc::new(MemoryRemoteStore::new());
    device(&remote, sample_store(), "u1").sync().unwrap();
    remote.fail_queries("laborers", "relation does not exist");
    remote.fail_upserts("systems", 1, false);

    let b = device(&remote, MemoryStore::new(), "u1");
    let result = b.sync().unwrap();

    assert!(!result.success);
    assert_eq!(result.errors.len(), 2);
    assert!(result.errors[0].starts_with("pull laborers"));
    assert!(result.errors[1].starts_with("push systems"));
    assert_eq!(result.records_pulled, 8);
    assert_eq!(result.records_pushed, 6);
    assert!(b.store().get_all(EntityKind::Laborer).unwrap().is_empty());

    let cursor = SyncCursor::load(b.store()).unwrap().unwrap();
    assert_eq!(cursor.last_sync, result.timestamp);
    assert_eq!(b.stats().cycles_completed, 1);
    assert!(b.stats().last_error.is_some());
}

#[test]
fn retired_fields_never_reach_the_remote() {
    let remote = Arc::new(MemoryRemoteStore::new());
    let store = MemoryStore::new();
    store
        .add(
            EntityKind::Material,
            material("M1", "Topcoat", "2024-06-01T00:00:00Z")
                .with("legacyMarkup", 1.4)
                .with("syncStatus", "dirty"),
        )
        .unwrap();
    device(&remote, store, "u1").sync().unwrap();

    let row = remote.row("materials", "M1").unwrap();
    assert!(row.fields().all(|(k, _)| k != "legacyMarkup" && k != "legacy_markup"));
    assert!(row.fields().all(|(k, _)| k != "syncStatus" && k != "sync_status"));
}
