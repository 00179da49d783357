//! Benchmarks of the query pipeline.
//!
//! Run with: `cargo bench --package mims-bench`

use chrono::TimeDelta;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mims_bench::{dashboard_indicators, populated_store, series_start, synthetic_bars};
use mims_lib::prelude::*;
use mims_lib::rollup;
use std::hint::black_box;
use std::sync::Arc;
use tempfile::TempDir;

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

fn indicator_benchmark(c: &mut Criterion) {
    let engine = IndicatorEngine::new();
    let indicators = dashboard_indicators();

    let mut group = c.benchmark_group("indicators");
    for size in SIZES {
        let bars = synthetic_bars(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("dashboard", size), &bars, |b, bars| {
            b.iter(|| {
                let mut series = CandleSeries::from_bars(bars.clone());
                black_box(engine.compute_all(&mut series, &indicators))
            });
        });

        // MACD alone exercises the dependency path.
        let macd = Indicator::Macd {
            long_period: 26,
            short_period: 12,
            smoothing: 2,
        };
        group.bench_with_input(BenchmarkId::new("macd", size), &bars, |b, bars| {
            b.iter(|| {
                let mut series = CandleSeries::from_bars(bars.clone());
                black_box(engine.compute(&mut series, &macd))
            });
        });
    }
    group.finish();
}

fn rollup_benchmark(c: &mut Criterion) {
    let bars = synthetic_bars(100_000);
    let mut group = c.benchmark_group("rollup");
    group.throughput(Throughput::Elements(bars.len() as u64));

    for interval in ["PT1H", "P1D", "P1W"] {
        let width: BucketWidth = interval.parse().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(interval), &width, |b, width| {
            b.iter(|| black_box(rollup(&bars, *width)));
        });
    }
    group.finish();
}

fn interval_benchmark(c: &mut Criterion) {
    let start = series_start();
    // Every other quarter hour ingested: worst case for merging.
    let fragments: Vec<Interval> = (0..10_000i64)
        .map(|i| {
            let from = start + TimeDelta::minutes(30 * i);
            Interval::new(from, from + TimeDelta::minutes(15)).unwrap()
        })
        .collect();
    let requested = Interval::new(start, start + TimeDelta::minutes(30 * 10_000)).unwrap();

    let mut group = c.benchmark_group("intervals");
    group.bench_function("combine", |b| {
        b.iter(|| black_box(Interval::combine(fragments.iter().copied())));
    });
    group.bench_function("gaps", |b| {
        b.iter(|| black_box(AvailabilityTracker::gaps(&requested, &fragments[..1_000])));
    });
    group.finish();
}

fn query_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (store, pair) = rt.block_on(populated_store(10_000)).unwrap();
    let orchestrator = QueryOrchestrator::from_store(Arc::new(store), OrchestratorConfig::default());

    // Leaves room for the widest warm-up (fib_96 at four hours).
    let start = series_start() + TimeDelta::days(30);
    let range = Interval::new(start, start + TimeDelta::days(60)).unwrap();
    let indicators = dashboard_indicators();

    let mut group = c.benchmark_group("query");
    group.sample_size(20);
    for interval in ["PT15M", "PT4H"] {
        let width: BucketWidth = interval.parse().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(interval), &width, |b, width| {
            b.iter(|| {
                rt.block_on(orchestrator.execute(pair.id, range, *width, &indicators))
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn snapshot_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (store, _) = rt.block_on(populated_store(10_000)).unwrap();
    let snapshot = rt.block_on(store.snapshot());
    let dir = TempDir::new().unwrap();
    let file = SnapshotFile::in_dir(dir.path());

    let mut group = c.benchmark_group("snapshot");
    group.sample_size(20);
    group.bench_function("save", |b| b.iter(|| file.save(&snapshot).unwrap()));
    group.bench_function("load", |b| b.iter(|| black_box(file.load().unwrap())));
    group.finish();
}

criterion_group!(
    benches,
    indicator_benchmark,
    rollup_benchmark,
    interval_benchmark,
    query_benchmark,
    snapshot_benchmark
);
criterion_main!(benches);
