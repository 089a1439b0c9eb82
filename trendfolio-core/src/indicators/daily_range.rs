//! Average daily range: trailing mean of |close[t] - close[t-1]|.
//!
//! A close-to-close volatility estimate in price units. The change series is
//! undefined at index 0, so the first valid value sits at index `period`.

use super::{abs_change, rolling_mean, Indicator};
use crate::domain::{closes, PriceBar};

#[derive(Debug, Clone)]
pub struct AverageDailyRange {
    period: usize,
}

impl AverageDailyRange {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "average daily range period must be >= 1");
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for AverageDailyRange {
    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        rolling_mean(&abs_change(&closes(bars)), self.period)
    }
}
