//! Sync cycle benchmarks.

use bizsync_bench::generate_dataset;
use bizsync_store::MemoryStore;
use bizsync_sync_engine::{MemoryRemoteStore, StaticAuth, SyncConfig, SyncEngine};
use bizsync_testkit::fixtures::seed;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

/// First sync of a populated store against an empty remote, then a
/// second device pulling everything.
fn bench_full_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync_cycle");
    group.sample_size(10);

    for per_kind in [100, 1_000].iter() {
        let dataset = generate_dataset(*per_kind, 0);

        group.throughput(Throughput::Elements(*per_kind as u64 * 5));
        group.bench_with_input(BenchmarkId::from_parameter(per_kind), per_kind, |b, _| {
            b.iter_with_setup(
                || {
                    let store = MemoryStore::new();
                    seed(&store, &dataset);
                    store
                },
                |store| {
                    let remote = Arc::new(MemoryRemoteStore::new());
                    let device_a = SyncEngine::new(
                        SyncConfig::default(),
                        Arc::clone(&remote),
                        store,
                        StaticAuth::signed_in("bench-user"),
                    );
                    let pushed = device_a.sync().unwrap();

                    let device_b = SyncEngine::new(
                        SyncConfig::default(),
                        remote,
                        MemoryStore::new(),
                        StaticAuth::signed_in("bench-user"),
                    );
                    let pulled = device_b.sync().unwrap();
                    black_box((pushed, pulled));
                },
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_full_cycle);
criterion_main!(benches);
