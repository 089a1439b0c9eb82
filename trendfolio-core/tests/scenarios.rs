//! End-to-end scenarios through the per-instrument pipeline and aggregation.

use chrono::{Duration, NaiveDate};
use trendfolio_core::domain::{PriceBar, Sector, Signal};
use trendfolio_core::signals::MaCrossover;
use trendfolio_core::sizing::{RiskBudget, VolatilityTargetSizer};
use trendfolio_core::{
    aggregate, ContractSource, ContractSpecRegistry, InstrumentError, InstrumentPipeline,
    PerformanceSummary, SectorMap,
};

fn linear_bars(start_price: f64, step: f64, n: usize, start: NaiveDate) -> Vec<PriceBar> {
    (0..n)
        .map(|i| {
            let close = start_price + step * i as f64;
            PriceBar::new(start + Duration::days(i as i64), close, close + 2.0, close - 2.0, close)
        })
        .collect()
}

fn default_pipeline<'a>(
    registry: &'a ContractSpecRegistry,
    sectors: &'a SectorMap,
    instrument_count: usize,
) -> InstrumentPipeline<'a> {
    let budget = RiskBudget::new(10_000_000.0 * 0.003, instrument_count).per_instrument();
    InstrumentPipeline::new(
        registry,
        sectors,
        Box::new(MaCrossover::default()),
        Box::new(VolatilityTargetSizer::new(budget, VolatilityTargetSizer::DEFAULT_VOL_WINDOW)),
    )
}

fn jan_2(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 2).unwrap()
}

#[test]
fn rising_es_goes_long_after_burn_in() {
    let registry = ContractSpecRegistry::reference();
    let sectors = SectorMap::reference();
    let bars = linear_bars(4000.0, 1.0, 200, jan_2(2020));

    let run = default_pipeline(&registry, &sectors, 1).run("ES", &bars).unwrap();

    assert_eq!(run.sector, Sector::EquityIndices);
    assert_eq!(run.terms.source, ContractSource::Registry);
    assert_eq!(run.terms.tick_value, 12.5);

    let signals = run.signals.as_slice();
    assert!(signals[..120].iter().all(|s| *s == Signal::Flat));
    assert!(signals[120..].iter().all(|s| *s == Signal::Long));

    assert!(run.positions.max() <= 1);
    assert_eq!(run.positions.last(), Some(1));
    assert!(run.pnl.pnl.iter().all(|p| *p >= 0.0));
    // Long from bar 120, earning from bar 121: 79 bars * 1 point * $50.
    assert_eq!(run.pnl.total(), 79.0 * 50.0);
}

#[test]
fn falling_cl_goes_short_and_profits() {
    let registry = ContractSpecRegistry::reference();
    let sectors = SectorMap::reference();
    let bars = linear_bars(90.0, -0.1, 200, jan_2(2020));

    let run = default_pipeline(&registry, &sectors, 1).run("CL", &bars).unwrap();

    assert!(run.signals.as_slice()[120..].iter().all(|s| *s == Signal::Short));
    assert_eq!(run.positions.max(), 15);
    assert!(run.pnl.total() > 0.0);
}

#[test]
fn unclassified_instrument_excluded() {
    let registry = ContractSpecRegistry::reference();
    let sectors = SectorMap::reference();
    let bars = linear_bars(100.0, 0.5, 50, jan_2(2020));

    let err = default_pipeline(&registry, &sectors, 1).run("KC", &bars).unwrap_err();
    assert_eq!(err, InstrumentError::Unclassified("KC".into()));
}

#[test]
fn non_monotonic_instrument_rejected() {
    let registry = ContractSpecRegistry::reference();
    let sectors = SectorMap::reference();
    let mut bars = linear_bars(100.0, 0.5, 50, jan_2(2020));
    bars[30].date = bars[10].date;

    let err = default_pipeline(&registry, &sectors, 1).run("GC", &bars).unwrap_err();
    assert!(matches!(err, InstrumentError::NonMonotonicDates { index: 30, .. }));
}

#[test]
fn partial_overlap_aggregates_on_union_axis() {
    let registry = ContractSpecRegistry::reference();
    let sectors = SectorMap::reference();
    let pipeline = default_pipeline(&registry, &sectors, 2);

    let gold = pipeline.run("GC", &linear_bars(1800.0, 2.0, 200, jan_2(2020))).unwrap();
    let crude = pipeline
        .run("CL", &linear_bars(60.0, 0.2, 200, jan_2(2020) + Duration::days(100)))
        .unwrap();

    let curves = aggregate(&[gold.pnl.clone(), crude.pnl.clone()], &sectors, 10_000_000.0);

    assert_eq!(curves.len(), 300);
    assert_eq!(curves.dates[0], jan_2(2020));
    assert_eq!(curves.sectors.len(), 2);

    let metals = curves.sector(Sector::Metals).unwrap();
    let energies = curves.sector(Sector::Energies).unwrap();
    // Crude contributes nothing before its first bar; gold nothing after its last.
    assert!(energies.pnl[..100].iter().all(|p| *p == 0.0));
    assert!(metals.pnl[200..].iter().all(|p| *p == 0.0));

    let expected_total = gold.pnl.total() + crude.pnl.total();
    let total: f64 = curves.total_pnl.iter().sum();
    assert!((total - expected_total).abs() < 1e-6);

    let final_equity = curves.total_equity.final_value().unwrap();
    assert!((final_equity - (10_000_000.0 + expected_total)).abs() < 1e-6);

    let summary = PerformanceSummary::compute(&curves);
    assert_eq!(summary.observations, 300);
    assert!(summary.annualized_return_pct > 0.0);
    assert!(summary.sharpe > 0.0);
    assert_eq!(summary.sortino, 0.0);
}

#[test]
fn tick_value_round_trip() {
    let registry = ContractSpecRegistry::reference();
    for spec in registry.iter() {
        assert_eq!(
            spec.tick_value(),
            spec.tick_size() * spec.big_point_value(),
            "{}",
            spec.symbol()
        );
        assert_eq!(registry.tick_value(spec.symbol()).unwrap(), spec.tick_value());
    }
    assert!(registry.tick_value("ZZZ").is_err());
}
