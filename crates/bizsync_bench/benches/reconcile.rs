//! Reconciliation benchmarks.

use bizsync_bench::{generate_records, overlapping_incoming};
use bizsync_model::EntityKind;
use bizsync_reconcile::{classify, Reconciler};
use bizsync_store::MemoryStore;
use bizsync_testkit::fixtures::seed;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Benchmark pure classification.
fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    for count in [100, 1_000, 10_000].iter() {
        let local = generate_records(EntityKind::Job, *count, 0);
        let incoming = overlapping_incoming(EntityKind::Job, *count);

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                let result = classify(
                    EntityKind::Job,
                    black_box(&local),
                    black_box(&incoming),
                    true,
                )
                .unwrap();
                black_box(result);
            });
        });
    }

    group.finish();
}

/// Benchmark preview against a memory store.
fn bench_preview(c: &mut Criterion) {
    let mut group = c.benchmark_group("preview");

    for count in [100, 1_000].iter() {
        let store = MemoryStore::new();
        seed(
            &store,
            &[(EntityKind::Laborer, generate_records(EntityKind::Laborer, *count, 0))],
        );
        let incoming = overlapping_incoming(EntityKind::Laborer, *count);
        let reconciler = Reconciler::new(&store);

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                let plan = reconciler
                    .preview(EntityKind::Laborer, black_box(&incoming), false)
                    .unwrap();
                black_box(plan);
            });
        });
    }

    group.finish();
}

/// Benchmark apply into a fresh store.
fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply");
    group.sample_size(20);

    for count in [100, 1_000].iter() {
        let local = generate_records(EntityKind::System, *count, 0);
        let incoming = overlapping_incoming(EntityKind::System, *count);

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter_with_setup(
                || {
                    let store = MemoryStore::new();
                    seed(&store, &[(EntityKind::System, local.clone())]);
                    store
                },
                |store| {
                    let report = Reconciler::new(&store)
                        .apply(EntityKind::System, black_box(&incoming), true)
                        .unwrap();
                    black_box(report);
                },
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classify, bench_preview, bench_apply);
criterion_main!(benches);
