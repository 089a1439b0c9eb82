//! Indicators: pure functions from a bar series to a numeric series.
//!
//! Every indicator returns a `Vec<f64>` the same length as its input. Values
//! that lack enough history are `f64::NAN`; no value at index t depends on
//! bars after t.

pub mod daily_range;
pub mod sma;

pub use daily_range::AverageDailyRange;
pub use sma::Sma;

use crate::domain::PriceBar;

/// Trait for indicators.
pub trait Indicator: Send + Sync {
    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[PriceBar]) -> Vec<f64>;
}

/// Trailing arithmetic mean over `window` values.
///
/// Index t is NaN while fewer than `window` values exist, or while any value
/// in the window is NaN. Each window is summed directly so that a window of
/// identical changes yields an exact result (no running-sum residue).
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }

    for (i, slot) in result.iter_mut().enumerate().skip(window - 1) {
        let span = &values[i + 1 - window..=i];
        if span.iter().any(|v| v.is_nan()) {
            continue;
        }
        *slot = span.iter().sum::<f64>() / window as f64;
    }
    result
}

/// Absolute first difference. Index 0 is NaN.
pub fn abs_change(values: &[f64]) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        result[i] = (values[i] - values[i - 1]).abs();
    }
    result
}

/// Create synthetic bars from close prices for testing.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
