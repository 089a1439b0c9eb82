//! Two-moving-average trend state.
//!
//! Long (+1) while the short SMA is strictly above the long SMA, Short (-1)
//! otherwise. Equal averages resolve to Short. A bar where either average
//! cannot be computed is Flat.

use super::SignalGenerator;
use crate::domain::{PriceBar, Signal, SignalSeries};
use crate::indicators::{Indicator, Sma};

/// Moving average crossover state model.
///
/// Unlike an event-style crossover, this keeps a constant market position:
/// every bar after burn-in is either Long or Short.
#[derive(Debug, Clone)]
pub struct MaCrossover {
    short: Sma,
    long: Sma,
}

impl MaCrossover {
    pub const DEFAULT_SHORT_WINDOW: usize = 20;
    pub const DEFAULT_LONG_WINDOW: usize = 120;

    /// Both windows must be >= 1. `short_window < long_window` is expected
    /// but not enforced; violating it yields a degenerate signal.
    pub fn new(short_window: usize, long_window: usize) -> Self {
        assert!(short_window >= 1, "short_window must be >= 1");
        assert!(long_window >= 1, "long_window must be >= 1");
        Self {
            short: Sma::new(short_window),
            long: Sma::new(long_window),
        }
    }

    pub fn short_window(&self) -> usize {
        self.short.period()
    }

    pub fn long_window(&self) -> usize {
        self.long.period()
    }
}

impl Default for MaCrossover {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SHORT_WINDOW, Self::DEFAULT_LONG_WINDOW)
    }
}

impl SignalGenerator for MaCrossover {
    fn warmup_bars(&self) -> usize {
        self.long.period()
    }

    fn raw_signals(&self, bars: &[PriceBar]) -> SignalSeries {
        let short = self.short.compute(bars);
        let long = self.long.compute(bars);
        let signals = short
            .iter()
            .zip(long.iter())
            .map(|(&s, &l)| {
                if s.is_nan() || l.is_nan() {
                    Signal::Flat
                } else if s > l {
                    Signal::Long
                } else {
                    Signal::Short
                }
            })
            .collect();
        SignalSeries::new(signals)
    }
}
