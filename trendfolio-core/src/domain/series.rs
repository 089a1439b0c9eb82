//! Date-aligned series produced by the engine.
//!
//! Every series is an immutable snapshot built once per run. Signal and
//! position series are aligned 1:1 with the instrument's price series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ternary trading state for one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Signal {
    Long,
    Short,
    #[default]
    Flat,
}

impl Signal {
    /// +1, -1 or 0.
    pub fn value(self) -> i8 {
        match self {
            Signal::Long => 1,
            Signal::Short => -1,
            Signal::Flat => 0,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.value())
    }
}

/// Signals aligned with a price series.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalSeries(Vec<Signal>);

impl SignalSeries {
    pub fn new(signals: Vec<Signal>) -> Self {
        Self(signals)
    }

    pub fn as_slice(&self) -> &[Signal] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Signal> {
        self.0.get(index).copied()
    }

    pub fn last(&self) -> Option<Signal> {
        self.0.last().copied()
    }

    /// Return a copy with the first `bars` entries forced to `Flat`.
    pub fn masked_prefix(&self, bars: usize) -> Self {
        let mut signals = self.0.clone();
        let end = bars.min(signals.len());
        signals[..end].fill(Signal::Flat);
        Self(signals)
    }
}

/// Integer contract counts aligned with a price series.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PositionSeries(Vec<u32>);

impl PositionSeries {
    pub fn new(contracts: Vec<u32>) -> Self {
        Self(contracts)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn max(&self) -> u32 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    pub fn last(&self) -> Option<u32> {
        self.0.last().copied()
    }
}

/// Daily dollar PnL of one instrument, on that instrument's own calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentPnl {
    pub symbol: String,
    pub dates: Vec<NaiveDate>,
    pub pnl: Vec<f64>,
}

impl InstrumentPnl {
    pub fn total(&self) -> f64 {
        self.pnl.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.pnl.iter().copied())
    }
}

/// Starting capital plus cumulative PnL, indexed by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityCurve {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl EquityCurve {
    /// Build a curve by accumulating `pnl` on top of `starting_capital`.
    ///
    /// `dates` and `pnl` must have equal length.
    pub fn from_pnl(dates: &[NaiveDate], pnl: &[f64], starting_capital: f64) -> Self {
        debug_assert_eq!(dates.len(), pnl.len());
        let values = pnl
            .iter()
            .scan(starting_capital, |equity, p| {
                *equity += p;
                Some(*equity)
            })
            .collect();
        Self { dates: dates.to_vec(), values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn final_value(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}
