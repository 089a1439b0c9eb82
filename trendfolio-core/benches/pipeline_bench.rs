//! Criterion benchmarks for the per-instrument pipeline and aggregation.

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use trendfolio_core::domain::{InstrumentPnl, PriceBar};
use trendfolio_core::indicators::{AverageDailyRange, Indicator, Sma};
use trendfolio_core::signals::MaCrossover;
use trendfolio_core::sizing::VolatilityTargetSizer;
use trendfolio_core::{aggregate, ContractSpecRegistry, InstrumentPipeline, SectorMap};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<PriceBar> {
    let base_date = NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.05).sin() * 10.0 + i as f64 * 0.01;
            PriceBar::new(
                base_date + Duration::days(i as i64),
                close - 0.3,
                close + 1.5,
                close - 1.5,
                close,
            )
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");
    for n in [1_000, 10_000] {
        let bars = make_bars(n);
        group.bench_with_input(BenchmarkId::new("sma_120", n), &bars, |b, bars| {
            let sma = Sma::new(120);
            b.iter(|| sma.compute(black_box(bars)))
        });
        group.bench_with_input(BenchmarkId::new("daily_range_40", n), &bars, |b, bars| {
            let adr = AverageDailyRange::new(40);
            b.iter(|| adr.compute(black_box(bars)))
        });
    }
    group.finish();
}

fn bench_instrument(c: &mut Criterion) {
    let registry = ContractSpecRegistry::reference();
    let sectors = SectorMap::reference();
    let pipeline = InstrumentPipeline::new(
        &registry,
        &sectors,
        Box::new(MaCrossover::default()),
        Box::new(VolatilityTargetSizer::new(5_000.0, 40)),
    );
    let bars = make_bars(5_000);
    c.bench_function("instrument_pipeline_5000", |b| {
        b.iter(|| pipeline.run(black_box("GC"), black_box(&bars)))
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let sectors = SectorMap::reference();
    let base = NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
    let instruments: Vec<InstrumentPnl> = sectors
        .symbols()
        .enumerate()
        .map(|(k, symbol)| InstrumentPnl {
            symbol: symbol.to_string(),
            dates: (0..5_000).map(|i| base + Duration::days(i + k as i64)).collect(),
            pnl: (0..5_000).map(|i| ((i + k as i64) as f64).sin()).collect(),
        })
        .collect();
    c.bench_function("aggregate_57x5000", |b| {
        b.iter(|| aggregate(black_box(&instruments), &sectors, 10_000_000.0))
    });
}

criterion_group!(benches, bench_indicators, bench_instrument, bench_aggregate);
criterion_main!(benches);
