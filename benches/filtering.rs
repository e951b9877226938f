//! Benchmarks for filtering and virtual window computation.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_precision_loss)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use execgrid::column_filter::{apply_filters, unique_values, FilterEngine};
use execgrid::layout::compute_window;
use execgrid::mic_country::CountryCodes;
use execgrid::types::{ColumnDescriptor, ColumnType, Row};

const TRADERS: &[&str] = &["alice", "bob", "carol", "dave", "erin"];
const SIDES: &[&str] = &["BUY", "SELL"];

fn columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::text("orderId", "Order ID"),
        ColumnDescriptor::text("trader", "Trader"),
        ColumnDescriptor::text("side", "Side"),
        ColumnDescriptor::new("price", "Price", Some(ColumnType::Decimal)),
        ColumnDescriptor::new("executionTime", "Time", Some(ColumnType::Datetime)),
    ]
}

fn rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| {
            Row::new()
                .with("executionId", i)
                .with("orderId", format!("O{i}"))
                .with("trader", TRADERS.get(i % TRADERS.len()).copied().unwrap_or_default())
                .with("side", SIDES.get(i % SIDES.len()).copied().unwrap_or_default())
                .with("price", 100.0 + (i % 500) as f64 / 8.0)
                .with("executionTime", format!("2024-03-05T{:02}:{:02}:00Z", i % 24, i % 60))
        })
        .collect()
}

/// Apply a two-column filter over growing row sets
fn bench_apply_filters(c: &mut Criterion) {
    let cols = columns();
    let countries = CountryCodes::default();
    let mut engine = FilterEngine::new();
    engine.toggle_value("trader", "alice");
    engine.toggle_value("trader", "carol");
    engine.toggle_value("side", "BUY");

    let mut group = c.benchmark_group("apply_filters");
    for size in [1_000usize, 10_000, 50_000] {
        let data = rows(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| apply_filters(black_box(data), &cols, &engine, &countries));
        });
    }
    group.finish();
}

/// Distinct values of a datetime column (formatting dominates)
fn bench_unique_values(c: &mut Criterion) {
    let cols = columns();
    let countries = CountryCodes::default();
    let data = rows(10_000);
    let column = cols.get(4).expect("time column");

    c.bench_function("unique_values_datetime_10k", |b| {
        b.iter(|| unique_values(black_box(&data), column, &countries));
    });
}

/// Window computation across a full scroll of 100k rows
fn bench_compute_window(c: &mut Criterion) {
    c.bench_function("compute_window_scroll_100k", |b| {
        b.iter(|| {
            let mut offset = 0.0;
            while offset < 4_200_000.0 {
                black_box(compute_window(offset, 500.0, 100_000, 42.0, 10));
                offset += 420.0;
            }
        });
    });
}

criterion_group!(
    benches,
    bench_apply_filters,
    bench_unique_values,
    bench_compute_window
);
criterion_main!(benches);
