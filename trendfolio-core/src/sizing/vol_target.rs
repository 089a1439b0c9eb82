//! Volatility-targeted sizer.
//!
//! # Formula
//! ```text
//! adr[t]          = mean(|close[i] - close[i-1]|, i in t-window+1..=t)
//! dollar_vol[t]   = adr[t] * (tick_value / tick_size)
//! raw[t]          = risk_budget / dollar_vol[t]       (0 if dollar_vol is 0 or undefined)
//! contracts[t]    = round(clip(raw[t], 0, cap))
//! ```
//!
//! # Example
//! - Risk budget: $3,973 per instrument
//! - ES average daily range: 40 points, multiplier $50/point
//! - Dollar volatility: $2,000 per contract
//! - Raw size 1.99, capped at the Equity Indices cap of 1 → 1 contract

use super::{clip_and_round, PositionSizer};
use crate::contracts::ContractTerms;
use crate::domain::{PositionSeries, PriceBar};
use crate::indicators::{AverageDailyRange, Indicator};

#[derive(Debug, Clone)]
pub struct VolatilityTargetSizer {
    /// Dollar risk budget per instrument.
    risk_budget: f64,
    range: AverageDailyRange,
}

impl VolatilityTargetSizer {
    pub const DEFAULT_VOL_WINDOW: usize = 40;

    pub fn new(risk_budget: f64, vol_window: usize) -> Self {
        assert!(risk_budget.is_finite(), "risk_budget must be finite");
        Self {
            risk_budget,
            range: AverageDailyRange::new(vol_window),
        }
    }

    pub fn risk_budget(&self) -> f64 {
        self.risk_budget
    }

    pub fn vol_window(&self) -> usize {
        self.range.period()
    }

    /// Per-contract dollar volatility estimate. NaN until the window fills.
    pub fn dollar_volatility(&self, bars: &[PriceBar], terms: &ContractTerms) -> Vec<f64> {
        let multiplier = terms.price_multiplier();
        self.range
            .compute(bars)
            .into_iter()
            .map(|adr| adr * multiplier)
            .collect()
    }

    /// Unclipped, unrounded sizes. Zero or undefined volatility sizes to 0.
    pub fn raw_sizes(&self, bars: &[PriceBar], terms: &ContractTerms) -> Vec<f64> {
        self.dollar_volatility(bars, terms)
            .into_iter()
            .map(|vol| {
                if vol.is_nan() || vol == 0.0 {
                    0.0
                } else {
                    self.risk_budget / vol
                }
            })
            .collect()
    }
}

impl PositionSizer for VolatilityTargetSizer {
    fn size(&self, bars: &[PriceBar], terms: &ContractTerms, cap: u32) -> PositionSeries {
        let contracts = self
            .raw_sizes(bars, terms)
            .into_iter()
            .map(|raw| clip_and_round(raw, cap))
            .collect();
        PositionSeries::new(contracts)
    }
}
