//! Signal generation: price series in, ternary signal series out.
//!
//! Generators compute a raw signal for every bar; the burn-in rule is then
//! applied once to the whole series as a separate mask, so the invariant
//! "the first `warmup_bars()` entries are Flat" holds for every generator.

pub mod ma_cross;

pub use ma_cross::MaCrossover;

use crate::domain::{PriceBar, SignalSeries};

/// Trait for signal generators.
///
/// Generators see only the instrument's own price history; they never see
/// positions, PnL or other instruments.
pub trait SignalGenerator: Send + Sync {
    /// Number of leading bars forced Flat by the burn-in mask.
    fn warmup_bars(&self) -> usize;

    /// Signal for every bar before burn-in masking.
    fn raw_signals(&self, bars: &[PriceBar]) -> SignalSeries;

    /// Signal series with the burn-in mask applied.
    fn generate(&self, bars: &[PriceBar]) -> SignalSeries {
        apply_burn_in(&self.raw_signals(bars), self.warmup_bars())
    }
}

/// Force the first `warmup_bars` entries to Flat, regardless of their value.
pub fn apply_burn_in(signals: &SignalSeries, warmup_bars: usize) -> SignalSeries {
    signals.masked_prefix(warmup_bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Signal;

    #[test]
    fn burn_in_overrides_computed_values() {
        let raw = SignalSeries::new(vec![Signal::Short, Signal::Long, Signal::Long, Signal::Short]);
        let masked = apply_burn_in(&raw, 2);
        assert_eq!(
            masked.as_slice(),
            &[Signal::Flat, Signal::Flat, Signal::Long, Signal::Short]
        );
    }

    #[test]
    fn zero_burn_in_is_identity() {
        let raw = SignalSeries::new(vec![Signal::Short, Signal::Long]);
        assert_eq!(apply_burn_in(&raw, 0), raw);
    }
}
