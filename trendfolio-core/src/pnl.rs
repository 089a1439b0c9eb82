//! Daily dollar PnL of one instrument.
//!
//! ```text
//! pnl[t] = (close[t] - close[t-1]) * (tick_value / tick_size) * contracts[t] * signal[t-1]
//! ```
//!
//! The previous bar's signal is used: a position decided on the close of
//! t-1 earns the move into t. `pnl[0]` is 0, and any non-finite product is 0.

use crate::contracts::ContractTerms;
use crate::domain::{InstrumentPnl, PositionSeries, PriceBar, SignalSeries};

/// Compute the instrument's daily PnL series on its own calendar.
///
/// # Panics
/// If `positions` or `signals` are not aligned with `bars`.
pub fn daily_pnl(
    symbol: &str,
    bars: &[PriceBar],
    positions: &PositionSeries,
    signals: &SignalSeries,
    terms: &ContractTerms,
) -> InstrumentPnl {
    assert_eq!(bars.len(), positions.len(), "positions must align with bars");
    assert_eq!(bars.len(), signals.len(), "signals must align with bars");

    let multiplier = terms.price_multiplier();
    let contracts = positions.as_slice();
    let signals = signals.as_slice();

    let mut pnl = vec![0.0; bars.len()];
    for t in 1..bars.len() {
        let change = bars[t].close - bars[t - 1].close;
        let value = change * multiplier * f64::from(contracts[t]) * signals[t - 1].as_f64();
        if value.is_finite() {
            pnl[t] = value;
        }
    }

    InstrumentPnl {
        symbol: symbol.to_string(),
        dates: bars.iter().map(|b| b.date).collect(),
        pnl,
    }
}
