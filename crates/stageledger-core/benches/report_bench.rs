//! Benchmarks for the cost model and report aggregation
//!
//! Targets:
//! - event_cost (warm cache) → <100ns
//! - aggregate(1000 events) → <5ms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stageledger_core::cost::CostModel;
use stageledger_core::report::aggregate;
use stageledger_core::EngineConfig;
use stageledger_types::{AssociationContribution, EventRecord, EventStatus};

/// Generate events with a few associations each
fn generate_test_events(count: usize) -> Vec<EventRecord> {
    (0..count)
        .map(|i| {
            let status = EventStatus::ALL[i % EventStatus::ALL.len()];
            // Repeats every 40 events so the cache sees hits
            let stage_size = 10.0 + (i % 40) as f64 * 2.5;

            (0..(i % 4) as u64 + 1).fold(
                EventRecord::new(i as u64, format!("Event {}", i), status, stage_size),
                |event, a| {
                    event.with_contribution(AssociationContribution::new(
                        (i as u64 + a) % 25,
                        format!("Association {}", (i as u64 + a) % 25),
                        (i % 7) as u32 + a as u32,
                    ))
                },
            )
        })
        .collect()
}

/// Benchmark 1: event_cost with warm and disabled caches
fn event_cost_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_cost");

    let cached = CostModel::default();
    let uncached = CostModel::new(EngineConfig {
        cache_capacity: 0,
        ..Default::default()
    });
    cached.event_cost(85.0);

    group.bench_function("cached", |b| {
        b.iter(|| black_box(cached.event_cost(black_box(85.0))));
    });
    group.bench_function("uncached", |b| {
        b.iter(|| black_box(uncached.event_cost(black_box(85.0))));
    });

    group.finish();
}

/// Benchmark 2: aggregate with varying event counts
fn aggregate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    let model = CostModel::default();

    for count in [10, 100, 1000] {
        let events = generate_test_events(count);
        group.bench_with_input(BenchmarkId::new("events", count), &events, |b, events| {
            b.iter(|| {
                black_box(aggregate(&model, events, None, false));
            });
        });
    }

    group.finish();
}

/// Benchmark 3: aggregate with per-event details and a status filter
fn aggregate_details_benchmark(c: &mut Criterion) {
    let model = CostModel::default();
    let events = generate_test_events(1000);

    c.bench_function("aggregate_details_completed", |b| {
        b.iter(|| {
            black_box(aggregate(
                &model,
                &events,
                Some(EventStatus::Completed),
                true,
            ));
        });
    });
}

criterion_group!(
    benches,
    event_cost_benchmark,
    aggregate_benchmark,
    aggregate_details_benchmark
);
criterion_main!(benches);
