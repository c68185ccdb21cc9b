//! Merge and persistence benchmarks.
//!
//! Run with: `cargo bench --package kline-bench`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use kline_aggregate::{merge_into, merged};
use kline_bench::synthetic_window;
use kline_store::{SqliteStore, WindowStore};
use std::hint::black_box;
use tempfile::TempDir;

/// Window sizes around the ~1500 assets a full poll returns.
const SIZES: [usize; 3] = [100, 1_500, 5_000];

fn merge_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    for size in SIZES {
        let target = synthetic_window(size, 100, 0);
        let source = synthetic_window(size, 90, 10);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("merge_into", size), &size, |b, _| {
            b.iter_batched(
                || target.clone(),
                |mut t| {
                    merge_into(&mut t, black_box(&source));
                    t
                },
                criterion::BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("merged", size), &size, |b, _| {
            b.iter(|| merged(black_box(&target), black_box(&source)));
        });
    }
    group.finish();
}

fn persist_benchmark(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(dir.path().join("bench.db")).unwrap();
    store.create_resolution_table("benchmin").unwrap();

    let mut group = c.benchmark_group("persist");
    group.sample_size(20);
    for size in SIZES {
        let window = synthetic_window(size, 100, 0);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("bulk_insert", size), &window, |b, window| {
            b.iter(|| store.bulk_insert("benchmin", "", window).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("upsert_current", size), &window, |b, window| {
            b.iter(|| store.upsert_current("benchmin", "live", window).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, merge_benchmark, persist_benchmark);
criterion_main!(benches);
