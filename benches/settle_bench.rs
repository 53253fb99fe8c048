//! Settlement Decision Benchmarks — Hot-Path Performance Validation
//!
//! Benchmarks the pure domain functions the sweeper evaluates for
//! every registry entry on every pass.
//!
//! Run with: cargo bench --bench settle_bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal_macros::dec;

use streambet::domain::offer::{Direction, OfferTerms};

/// Benchmark the settlement comparison for both directions.
fn bench_owner_wins(c: &mut Criterion) {
    c.bench_function("owner_wins_call", |b| {
        b.iter(|| Direction::Call.owner_wins(black_box(dec!(2000)), black_box(dec!(2100))));
    });

    c.bench_function("owner_wins_put", |b| {
        b.iter(|| Direction::Put.owner_wins(black_box(dec!(2000)), black_box(dec!(2100))));
    });
}

/// Benchmark terms validation as run on every offer creation.
fn bench_terms_validation(c: &mut Criterion) {
    c.bench_function("offer_terms_new", |b| {
        b.iter(|| {
            OfferTerms::new(
                black_box("alice".to_string()),
                black_box(dec!(2000)),
                Direction::Call,
                black_box(604_800),
                black_box(dec!(10)),
                black_box("ETH-USD".to_string()),
            )
        });
    });
}

criterion_group!(benches, bench_owner_wins, bench_terms_validation);
criterion_main!(benches);
