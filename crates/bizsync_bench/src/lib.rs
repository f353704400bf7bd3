//! Benchmark utilities.

use bizsync_model::{format_timestamp, EntityKind, Record};
use bizsync_testkit::fixtures::record;
use chrono::{DateTime, Duration, Utc};

/// Base timestamp for generated records.
fn base_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_717_200_000, 0).unwrap_or_default()
}

/// Generates `count` valid records of `kind`, ids `0..count`, each one
/// minute newer than the last, offset by `skew_minutes`.
pub fn generate_records(kind: EntityKind, count: usize, skew_minutes: i64) -> Vec<Record> {
    let base = base_time();
    (0..count)
        .map(|i| {
            let ts = base + Duration::minutes(i as i64 + skew_minutes);
            record(kind, &format!("{}-{i}", kind.label()), &format_timestamp(ts))
        })
        .collect()
}

/// A dataset with `per_kind` records in every collection and one row in
/// every singleton.
pub fn generate_dataset(per_kind: usize, skew_minutes: i64) -> Vec<(EntityKind, Vec<Record>)> {
    EntityKind::ALL
        .into_iter()
        .map(|kind| {
            let count = if kind.is_singleton() { 1 } else { per_kind };
            (kind, generate_records(kind, count, skew_minutes))
        })
        .collect()
}

/// Generates an incoming set overlapping `local` by half: the first half
/// of the ids are newer, the rest are new.
pub fn overlapping_incoming(kind: EntityKind, count: usize) -> Vec<Record> {
    let base = base_time();
    (0..count)
        .map(|i| {
            let id = format!("{}-{}", kind.label(), i + count / 2);
            let ts = base + Duration::days(1) + Duration::minutes(i as i64);
            record(kind, &id, &format_timestamp(ts))
        })
        .collect()
}
