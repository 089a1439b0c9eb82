//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Signals are ternary and Flat through the burn-in window
//! 2. Position sizes stay within [0, cap]
//! 3. PnL is zero whenever the previous signal is Flat or the size is zero
//! 4. Risk ratios are zero for constant returns
//! 5. Portfolio PnL equals the sum of its sectors

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use trendfolio_core::contracts::{ContractSource, ContractTerms};
use trendfolio_core::domain::{InstrumentPnl, PriceBar, Signal};
use trendfolio_core::metrics::{sharpe_ratio, sortino_ratio};
use trendfolio_core::pnl::daily_pnl;
use trendfolio_core::portfolio::aggregate;
use trendfolio_core::signals::{MaCrossover, SignalGenerator};
use trendfolio_core::sizing::{PositionSizer, VolatilityTargetSizer};
use trendfolio_core::SectorMap;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-3.0..3.0_f64, 1..max_len).prop_map(|steps| {
        let mut price = 1000.0;
        steps
            .into_iter()
            .map(|step| {
                price = (price + step).max(1.0);
                (price * 100.0).round() / 100.0
            })
            .collect()
    })
}

fn arb_terms() -> impl Strategy<Value = ContractTerms> {
    (
        prop::sample::select(vec![0.01, 0.05, 0.1, 0.25, 0.5]),
        1.0..100.0_f64,
    )
        .prop_map(|(tick_size, tick_value)| ContractTerms {
            tick_size,
            tick_value,
            source: ContractSource::Registry,
        })
}

fn bars_from(closes: &[f64]) -> Vec<PriceBar> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceBar::new(start + Duration::days(i as i64), c, c + 1.0, c - 1.0, c))
        .collect()
}

// ── 1. Signals ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn signals_are_ternary_and_burned_in(
        closes in arb_closes(160),
        short in 1usize..15,
        extra in 0usize..30,
    ) {
        let long = short + extra;
        let generator = MaCrossover::new(short, long);
        let bars = bars_from(&closes);
        let signals = generator.generate(&bars);

        prop_assert_eq!(signals.len(), bars.len());
        for (i, s) in signals.as_slice().iter().enumerate() {
            prop_assert!([-1, 0, 1].contains(&s.value()));
            if i < long {
                prop_assert_eq!(*s, Signal::Flat);
            } else {
                prop_assert_ne!(*s, Signal::Flat);
            }
        }
    }
}

// ── 2. Position bounds ───────────────────────────────────────────────

proptest! {
    #[test]
    fn positions_stay_within_cap(
        closes in arb_closes(120),
        terms in arb_terms(),
        budget in 0.0..1_000_000.0_f64,
        window in 1usize..50,
        cap in 0u32..20,
    ) {
        let bars = bars_from(&closes);
        let sizer = VolatilityTargetSizer::new(budget, window);
        let positions = sizer.size(&bars, &terms, cap);

        prop_assert_eq!(positions.len(), bars.len());
        prop_assert!(positions.as_slice().iter().all(|&c| c <= cap));
    }
}

// ── 3. PnL gating ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn pnl_zero_when_flat_or_unsized(
        closes in arb_closes(120),
        terms in arb_terms(),
        budget in 1_000.0..200_000.0_f64,
    ) {
        let bars = bars_from(&closes);
        let signals = MaCrossover::new(3, 10).generate(&bars);
        let positions = VolatilityTargetSizer::new(budget, 5).size(&bars, &terms, 15);
        let pnl = daily_pnl("XX", &bars, &positions, &signals, &terms);

        prop_assert_eq!(pnl.pnl.len(), bars.len());
        prop_assert_eq!(pnl.pnl[0], 0.0);
        for t in 1..bars.len() {
            let prev = signals.as_slice()[t - 1];
            if prev == Signal::Flat || positions.as_slice()[t] == 0 {
                prop_assert_eq!(pnl.pnl[t], 0.0);
            }
            prop_assert!(pnl.pnl[t].is_finite());
        }
    }
}

// ── 4. Risk ratios ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn constant_returns_have_zero_ratios(r in -0.05..0.05_f64, n in 0usize..300) {
        let returns = vec![r; n];
        prop_assert_eq!(sharpe_ratio(&returns), 0.0);
        prop_assert_eq!(sortino_ratio(&returns), 0.0);
    }
}

// ── 5. Aggregation ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn total_pnl_is_sum_of_sectors(
        a in prop::collection::vec(-1_000.0..1_000.0_f64, 1..40),
        b in prop::collection::vec(-1_000.0..1_000.0_f64, 1..40),
        offset in 0i64..20,
    ) {
        let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let inst = |symbol: &str, pnl: &[f64], shift: i64| InstrumentPnl {
            symbol: symbol.to_string(),
            dates: (0..pnl.len()).map(|i| start + Duration::days(i as i64 + shift)).collect(),
            pnl: pnl.to_vec(),
        };
        let instruments = vec![inst("GC", &a, 0), inst("CL", &b, offset)];
        let curves = aggregate(&instruments, &SectorMap::reference(), 1_000_000.0);

        for (t, total) in curves.total_pnl.iter().enumerate() {
            let sum: f64 = curves.sectors.iter().map(|s| s.pnl[t]).sum();
            prop_assert!((total - sum).abs() < 1e-6);
        }
        let grand: f64 = curves.total_pnl.iter().sum();
        let expected: f64 = a.iter().chain(b.iter()).sum();
        prop_assert!((grand - expected).abs() < 1e-6);
    }
}
