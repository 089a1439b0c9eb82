//! Portfolio aggregation: per-instrument PnL into sector and total curves.
//!
//! Instruments are grouped by the sector classification. Unclassified
//! instruments are dropped without contribution. All included series are
//! mapped onto one canonical [`DateAxis`] before summing.

pub mod align;

pub use align::DateAxis;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{EquityCurve, InstrumentPnl, Sector};
use crate::universe::SectorMap;

/// One sector's summed PnL and equity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorCurve {
    pub sector: Sector,
    /// Contributing symbols, sorted.
    pub instruments: Vec<String>,
    /// Daily PnL on the portfolio date axis.
    pub pnl: Vec<f64>,
    pub equity: EquityCurve,
}

/// Sector and total portfolio curves on a shared date axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioCurves {
    pub starting_capital: f64,
    pub dates: Vec<NaiveDate>,
    /// Only sectors with at least one contributing instrument, in canonical order.
    pub sectors: Vec<SectorCurve>,
    pub total_pnl: Vec<f64>,
    pub total_equity: EquityCurve,
    /// Symbols dropped for lack of a sector classification.
    pub excluded: Vec<String>,
}

impl PortfolioCurves {
    pub fn sector(&self, sector: Sector) -> Option<&SectorCurve> {
        self.sectors.iter().find(|c| c.sector == sector)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Aggregate instrument PnL into sector and total curves.
pub fn aggregate(
    instruments: &[InstrumentPnl],
    sectors: &SectorMap,
    starting_capital: f64,
) -> PortfolioCurves {
    let mut grouped: BTreeMap<Sector, Vec<&InstrumentPnl>> = BTreeMap::new();
    let mut excluded = Vec::new();
    for inst in instruments {
        match sectors.sector_of(&inst.symbol) {
            Some(sector) => grouped.entry(sector).or_default().push(inst),
            None => excluded.push(inst.symbol.clone()),
        }
    }
    excluded.sort();

    let axis = DateAxis::union(grouped.values().flatten().map(|inst| inst.dates.as_slice()));

    let mut total_pnl = vec![0.0; axis.len()];
    let mut sector_curves = Vec::with_capacity(grouped.len());
    for (sector, members) in grouped {
        let mut pnl = vec![0.0; axis.len()];
        for inst in &members {
            axis.accumulate(&mut pnl, &inst.dates, &inst.pnl);
        }
        for (total, p) in total_pnl.iter_mut().zip(&pnl) {
            *total += p;
        }

        let mut symbols: Vec<String> = members.iter().map(|i| i.symbol.clone()).collect();
        symbols.sort();

        sector_curves.push(SectorCurve {
            sector,
            instruments: symbols,
            equity: EquityCurve::from_pnl(axis.dates(), &pnl, starting_capital),
            pnl,
        });
    }

    PortfolioCurves {
        starting_capital,
        dates: axis.dates().to_vec(),
        total_equity: EquityCurve::from_pnl(axis.dates(), &total_pnl, starting_capital),
        sectors: sector_curves,
        total_pnl,
        excluded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn pnl(symbol: &str, days: &[u32], values: &[f64]) -> InstrumentPnl {
        InstrumentPnl {
            symbol: symbol.to_string(),
            dates: days.iter().map(|&x| d(x)).collect(),
            pnl: values.to_vec(),
        }
    }

    fn sectors() -> SectorMap {
        SectorMap::new([
            (Sector::EquityIndices, vec!["ES", "NQ"]),
            (Sector::Metals, vec!["GC"]),
            (Sector::Currencies, vec!["EC"]),
        ])
        .unwrap()
    }

    #[test]
    fn partially_overlapping_instruments_zero_fill() {
        let es = pnl("ES", &[2, 3, 4], &[10.0, 20.0, 30.0]);
        let nq = pnl("NQ", &[3, 4, 5], &[1.0, 2.0, 3.0]);
        let curves = aggregate(&[es, nq], &sectors(), 1_000.0);

        assert_eq!(curves.dates, vec![d(2), d(3), d(4), d(5)]);
        let eq = curves.sector(Sector::EquityIndices).unwrap();
        assert_eq!(eq.pnl, vec![10.0, 21.0, 32.0, 3.0]);
        assert_eq!(eq.equity.values, vec![1010.0, 1031.0, 1063.0, 1066.0]);
        assert_eq!(eq.instruments, vec!["ES".to_string(), "NQ".to_string()]);
    }

    #[test]
    fn total_is_sum_of_sectors() {
        let es = pnl("ES", &[2, 3], &[10.0, -5.0]);
        let gc = pnl("GC", &[3, 4], &[7.0, 1.0]);
        let curves = aggregate(&[es, gc], &sectors(), 100.0);

        assert_eq!(curves.total_pnl, vec![10.0, 2.0, 1.0]);
        assert_eq!(curves.total_equity.values, vec![110.0, 112.0, 113.0]);
        let sum: Vec<f64> = (0..curves.len())
            .map(|i| curves.sectors.iter().map(|s| s.pnl[i]).sum())
            .collect();
        assert_eq!(sum, curves.total_pnl);
    }

    #[test]
    fn unclassified_instrument_is_excluded() {
        let es = pnl("ES", &[2, 3], &[10.0, 10.0]);
        let kc = pnl("KC", &[1, 2, 3], &[999.0, 999.0, 999.0]);
        let curves = aggregate(&[es, kc], &sectors(), 100.0);

        assert_eq!(curves.excluded, vec!["KC".to_string()]);
        // KC's extra date does not enter the axis.
        assert_eq!(curves.dates, vec![d(2), d(3)]);
        assert_eq!(curves.total_pnl, vec![10.0, 10.0]);
        assert!(curves
            .sectors
            .iter()
            .all(|s| !s.instruments.contains(&"KC".to_string())));
    }

    #[test]
    fn empty_sectors_are_omitted() {
        let es = pnl("ES", &[2], &[1.0]);
        let curves = aggregate(&[es], &sectors(), 100.0);
        assert_eq!(curves.sectors.len(), 1);
        assert!(curves.sector(Sector::Metals).is_none());
        assert!(curves.sector(Sector::Currencies).is_none());
    }

    #[test]
    fn sectors_in_canonical_order() {
        let ec = pnl("EC", &[2], &[1.0]);
        let gc = pnl("GC", &[2], &[1.0]);
        let es = pnl("ES", &[2], &[1.0]);
        let curves = aggregate(&[ec, gc, es], &sectors(), 100.0);
        let order: Vec<Sector> = curves.sectors.iter().map(|s| s.sector).collect();
        assert_eq!(order, vec![Sector::EquityIndices, Sector::Metals, Sector::Currencies]);
    }

    #[test]
    fn no_instruments_gives_empty_curves() {
        let curves = aggregate(&[], &sectors(), 100.0);
        assert!(curves.is_empty());
        assert!(curves.sectors.is_empty());
        assert!(curves.total_equity.is_empty());
    }
}
