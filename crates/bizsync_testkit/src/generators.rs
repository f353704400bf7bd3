//! Property-based test generators using proptest.
//!
//! Strategies produce records that satisfy the field schemas, so they can
//! flow through validation, reconciliation and export unchanged.

use crate::fixtures::record;
use bizsync_model::{format_timestamp, EntityKind, Record};
use chrono::DateTime;
use proptest::prelude::*;

/// Strategy for entity kinds.
pub fn kind_strategy() -> impl Strategy<Value = EntityKind> {
    prop::sample::select(EntityKind::ALL.to_vec())
}

/// Strategy for collection (non-singleton) kinds with timestamps.
pub fn timestamped_collection_kind_strategy() -> impl Strategy<Value = EntityKind> {
    let kinds: Vec<_> = EntityKind::ALL
        .into_iter()
        .filter(|k| k.has_timestamp() && !k.is_singleton())
        .collect();
    prop::sample::select(kinds)
}

/// Strategy for `updatedAt` values within a few days of 2024-01-01.
///
/// The narrow range makes equal timestamps likely.
pub fn timestamp_strategy() -> impl Strategy<Value = String> {
    (0i64..5).prop_map(|day| {
        let secs = 1_704_067_200 + day * 86_400;
        DateTime::from_timestamp(secs, 0)
            .map(format_timestamp)
            .unwrap_or_default()
    })
}

/// Strategy for record ids drawn from a small pool so sets overlap.
pub fn id_strategy() -> impl Strategy<Value = String> {
    (1u8..8).prop_map(|n| format!("R{n}"))
}

/// Strategy for a valid record of `kind`.
pub fn record_strategy(kind: EntityKind) -> impl Strategy<Value = Record> {
    (id_strategy(), timestamp_strategy()).prop_map(move |(id, ts)| record(kind, &id, &ts))
}

/// Strategy for a set of records of `kind` with unique ids.
///
/// Singleton kinds yield at most one record.
pub fn record_set_strategy(kind: EntityKind) -> impl Strategy<Value = Vec<Record>> {
    let max = if kind.is_singleton() { 2 } else { 7 };
    prop::collection::btree_map(id_strategy(), timestamp_strategy(), 0..max).prop_map(
        move |rows| {
            rows.into_iter()
                .map(|(id, ts)| record(kind, &id, &ts))
                .collect()
        },
    )
}

/// Strategy for a `(local, incoming)` pair of record sets of one kind.
pub fn reconcile_input_strategy() -> impl Strategy<Value = (EntityKind, Vec<Record>, Vec<Record>)>
{
    kind_strategy().prop_flat_map(|kind| {
        (
            Just(kind),
            record_set_strategy(kind),
            record_set_strategy(kind),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    proptest! {
        #[test]
        fn record_sets_have_unique_ids((kind, local, incoming) in reconcile_input_strategy()) {
            for set in [&local, &incoming] {
                let ids: HashSet<_> = set.iter().filter_map(|r| r.id()).collect();
                prop_assert_eq!(ids.len(), set.len());
                if kind.is_singleton() {
                    prop_assert!(set.len() <= 1);
                }
            }
        }

        #[test]
        fn timestamps_parse(ts in timestamp_strategy()) {
            prop_assert!(bizsync_model::parse_timestamp(&ts).is_some());
        }
    }
}
