//! Position sizing: turn a risk budget into whole contracts per day.
//!
//! Sizers are signal-agnostic: they size every bar, and the PnL step decides
//! direction from the signal.

pub mod vol_target;

pub use vol_target::VolatilityTargetSizer;

use serde::{Deserialize, Serialize};

use crate::contracts::ContractTerms;
use crate::domain::{PositionSeries, PriceBar, Sector};

/// Position sizing logic.
pub trait PositionSizer: Send + Sync {
    /// Contract count for every bar, bounded by `cap`.
    fn size(&self, bars: &[PriceBar], terms: &ContractTerms, cap: u32) -> PositionSeries;
}

/// Equal-risk-contribution split of a total dollar risk budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskBudget {
    /// Portfolio-level daily dollar risk target.
    pub total: f64,
    /// Universe size N the budget is spread across.
    pub instrument_count: usize,
}

impl RiskBudget {
    pub fn new(total: f64, instrument_count: usize) -> Self {
        Self { total, instrument_count }
    }

    /// `total / sqrt(N)`; zero for an empty universe.
    pub fn per_instrument(&self) -> f64 {
        if self.instrument_count == 0 {
            return 0.0;
        }
        self.total / (self.instrument_count as f64).sqrt()
    }
}

/// Maximum contracts per instrument, by sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorCaps {
    pub currencies: u32,
    pub equity_indices: u32,
    /// Every other sector.
    pub default: u32,
}

impl Default for SectorCaps {
    fn default() -> Self {
        Self {
            currencies: 4,
            equity_indices: 1,
            default: 15,
        }
    }
}

impl SectorCaps {
    pub fn cap_for(&self, sector: Sector) -> u32 {
        match sector {
            Sector::Currencies => self.currencies,
            Sector::EquityIndices => self.equity_indices,
            _ => self.default,
        }
    }
}

/// Clip a raw (possibly undefined) size to `[0, cap]` and round half-to-even.
pub fn clip_and_round(raw: f64, cap: u32) -> u32 {
    if raw.is_nan() {
        return 0;
    }
    let clipped = raw.clamp(0.0, f64::from(cap));
    // Clamped into [0, cap], so the cast is lossless.
    clipped.round_ties_even() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_instrument_budget_scales_with_sqrt_n() {
        let budget = RiskBudget::new(30_000.0, 4);
        assert_eq!(budget.per_instrument(), 15_000.0);
        let bigger = RiskBudget::new(30_000.0, 16);
        assert_eq!(bigger.per_instrument(), 7_500.0);
    }

    #[test]
    fn empty_universe_has_no_budget() {
        assert_eq!(RiskBudget::new(30_000.0, 0).per_instrument(), 0.0);
    }

    #[test]
    fn default_caps() {
        let caps = SectorCaps::default();
        assert_eq!(caps.cap_for(Sector::Currencies), 4);
        assert_eq!(caps.cap_for(Sector::EquityIndices), 1);
        assert_eq!(caps.cap_for(Sector::Metals), 15);
        assert_eq!(caps.cap_for(Sector::RatesAndBonds), 15);
        assert_eq!(caps.cap_for(Sector::Energies), 15);
        assert_eq!(caps.cap_for(Sector::Agriculture), 15);
    }

    #[test]
    fn clip_and_round_bounds() {
        assert_eq!(clip_and_round(f64::NAN, 4), 0);
        assert_eq!(clip_and_round(-3.0, 4), 0);
        assert_eq!(clip_and_round(f64::INFINITY, 4), 4);
        assert_eq!(clip_and_round(9.7, 4), 4);
        assert_eq!(clip_and_round(2.4, 4), 2);
        assert_eq!(clip_and_round(2.6, 4), 3);
    }

    #[test]
    fn clip_and_round_half_to_even() {
        assert_eq!(clip_and_round(0.5, 15), 0);
        assert_eq!(clip_and_round(1.5, 15), 2);
        assert_eq!(clip_and_round(2.5, 15), 2);
    }
}
