//! Performance metrics: pure functions over the total portfolio series.
//!
//! Every metric is a pure function: PnL or equity in, scalar out. Degenerate
//! inputs (too few observations, zero or undefined dispersion) yield 0, never
//! NaN or infinity.

use serde::{Deserialize, Serialize};

use crate::portfolio::PortfolioCurves;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Floor on final/starting equity before the fractional power. Keeps the
/// base positive when the portfolio has lost everything or more.
pub const MIN_GROWTH_RATIO: f64 = 0.01;

/// Summary statistics for one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Annualized return, in percent.
    pub annualized_return_pct: f64,
    pub sharpe: f64,
    pub sortino: f64,
    /// Final equity over starting capital minus 1, in percent.
    pub total_return_pct: f64,
    /// Largest peak-to-trough decline of total equity, as a negative percent.
    pub max_drawdown_pct: f64,
    pub final_equity: f64,
    pub observations: usize,
}

impl PerformanceSummary {
    /// Compute the summary from aggregated portfolio curves.
    pub fn compute(curves: &PortfolioCurves) -> Self {
        Self::from_series(&curves.total_pnl, &curves.total_equity.values, curves.starting_capital)
    }

    /// Compute the summary from total daily PnL and the matching equity curve.
    pub fn from_series(total_pnl: &[f64], equity: &[f64], starting_capital: f64) -> Self {
        let returns = daily_returns(total_pnl, starting_capital);
        let final_equity = equity.last().copied().unwrap_or(starting_capital);
        let observations = equity.len();
        Self {
            annualized_return_pct: annualized_return_pct(
                final_equity,
                starting_capital,
                observations,
            ),
            sharpe: sharpe_ratio(&returns),
            sortino: sortino_ratio(&returns),
            total_return_pct: total_return_pct(final_equity, starting_capital),
            max_drawdown_pct: max_drawdown_pct(equity),
            final_equity,
            observations,
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// `(max(0.01, final/start))^(252/n) - 1`, in percent.
///
/// Returns 0.0 for an empty curve or non-positive starting capital.
pub fn annualized_return_pct(final_equity: f64, starting_capital: f64, observations: usize) -> f64 {
    if observations == 0 || starting_capital <= 0.0 {
        return 0.0;
    }
    let ratio = (final_equity / starting_capital).max(MIN_GROWTH_RATIO);
    let exponent = TRADING_DAYS_PER_YEAR / observations as f64;
    (ratio.powf(exponent) - 1.0) * 100.0
}

/// Total return in percent.
pub fn total_return_pct(final_equity: f64, starting_capital: f64) -> f64 {
    if starting_capital <= 0.0 {
        return 0.0;
    }
    (final_equity / starting_capital - 1.0) * 100.0
}

/// Daily PnL expressed as a fraction of starting capital.
pub fn daily_returns(pnl: &[f64], starting_capital: f64) -> Vec<f64> {
    if starting_capital <= 0.0 {
        return vec![0.0; pnl.len()];
    }
    pnl.iter().map(|p| p / starting_capital).collect()
}

/// Annualized Sharpe ratio: mean / sample std * sqrt(252).
///
/// Returns 0.0 if the standard deviation is zero or undefined.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    let std = match sample_std(returns) {
        Some(std) if std > 0.0 && std.is_finite() => std,
        _ => return 0.0,
    };
    mean(returns) / std * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Annualized Sortino ratio: mean of all returns / sample std of the
/// strictly negative returns * sqrt(252).
///
/// Returns 0.0 when there are no negative returns, or when their standard
/// deviation is zero or undefined.
pub fn sortino_ratio(returns: &[f64]) -> f64 {
    let downside: Vec<f64> = returns.iter().copied().filter(|&r| r < 0.0).collect();
    let downside_std = match sample_std(&downside) {
        Some(std) if std > 0.0 && std.is_finite() => std,
        _ => return 0.0,
    };
    mean(returns) / downside_std * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Maximum drawdown as a negative percent (e.g., -15.0 = 15% drawdown).
///
/// Returns 0.0 if equity never declines from a positive peak.
pub fn max_drawdown_pct(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for &eq in equity {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            max_dd = max_dd.min((eq - peak) / peak);
        }
    }
    max_dd * 100.0
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1). `None` for fewer than two values.
fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    // Exactly zero for constant input, regardless of rounding in the mean.
    if values.iter().all(|v| *v == values[0]) {
        return Some(0.0);
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}
