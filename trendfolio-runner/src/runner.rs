//! Portfolio backtest runner — wires config, reference data, the
//! per-instrument pipeline and aggregation together.
//!
//! Two entry points:
//! - `run_backtest()`: loads reference data and prices, then runs. Used by CLI.
//! - `run_portfolio()`: takes pre-loaded data, no I/O.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use trendfolio_core::domain::Sector;
use trendfolio_core::{
    aggregate, ContractSource, ContractSpecRegistry, InstrumentPipeline, PerformanceSummary,
    PortfolioCurves, SectorMap,
};

use crate::config::{BacktestConfig, ConfigError, RunId};
use crate::data_loader::{
    load_prices, DataSource, LoadError, LoadOptions, LoadedData, RejectedInstrument,
};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Outcome of one admitted instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentReport {
    pub symbol: String,
    pub sector: Sector,
    pub contract_source: ContractSource,
    pub data_source: DataSource,
    pub tick_size: f64,
    pub tick_value: f64,
    pub cap: u32,
    pub bar_count: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Signal on the last bar (-1, 0, 1).
    pub final_signal: i8,
    /// Contracts on the last bar.
    pub final_position: u32,
    pub total_pnl: f64,
}

/// Complete result of a portfolio backtest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub dataset_hash: String,
    pub starting_capital: f64,
    pub has_synthetic: bool,
    /// Risk budget per instrument actually used for sizing.
    pub risk_budget_per_instrument: f64,
    pub instruments: Vec<InstrumentReport>,
    pub rejected: Vec<RejectedInstrument>,
    /// Data files skipped for lack of a sector classification.
    pub unclassified: Vec<String>,
    pub curves: PortfolioCurves,
    pub summary: PerformanceSummary,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.curves.dates.first().copied()
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.curves.dates.last().copied()
    }

    pub fn fallback_count(&self) -> usize {
        self.instruments
            .iter()
            .filter(|r| r.contract_source == ContractSource::Fallback)
            .count()
    }
}

/// Load reference data and prices per `config` and `opts`, then run.
pub fn run_backtest(
    config: &BacktestConfig,
    opts: &LoadOptions,
) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let registry = config.load_contracts()?;
    let sectors = config.load_sectors()?;
    let loaded = load_prices(&registry, &sectors, &config.fallback, opts)?;
    Ok(run_portfolio(config, &registry, &sectors, &loaded))
}

/// Run every loaded instrument in parallel and aggregate the results.
///
/// Instruments are processed independently; the merge is in symbol order
/// so the result does not depend on scheduling.
pub fn run_portfolio(
    config: &BacktestConfig,
    registry: &ContractSpecRegistry,
    sectors: &SectorMap,
    loaded: &LoadedData,
) -> BacktestResult {
    let mut rejected = loaded.rejected.clone();
    let admitted: Vec<_> = loaded
        .series
        .values()
        .filter(|s| {
            if s.bars.is_empty() {
                warn!(symbol = %s.symbol, "no bars in the selected date range; rejecting");
                rejected.push(RejectedInstrument {
                    symbol: s.symbol.clone(),
                    reason: "no bars in the selected date range".into(),
                });
                false
            } else {
                true
            }
        })
        .collect();

    // R is split over the whole classified universe, not over the files present.
    let budget = config.risk_budget(sectors.len());
    let pipeline = InstrumentPipeline::new(
        registry,
        sectors,
        Box::new(config.signal_generator()),
        Box::new(config.sizer(sectors.len())),
    )
    .with_caps(config.sizing.caps())
    .with_fallback(config.fallback);

    let outcomes: Vec<_> = admitted
        .par_iter()
        .map(|s| (*s, pipeline.run(&s.symbol, &s.bars)))
        .collect();

    let mut reports = Vec::with_capacity(outcomes.len());
    let mut pnls = Vec::with_capacity(outcomes.len());
    for (series, outcome) in outcomes {
        match outcome {
            Ok(run) => {
                if run.terms.is_fallback() {
                    warn!(
                        symbol = %run.symbol,
                        tick_size = run.terms.tick_size,
                        tick_value = run.terms.tick_value,
                        "no contract spec; using fallback terms"
                    );
                }
                debug!(symbol = %run.symbol, pnl = run.pnl.total(), "instrument complete");
                reports.push(InstrumentReport {
                    symbol: run.symbol.clone(),
                    sector: run.sector,
                    contract_source: run.terms.source,
                    data_source: series.source,
                    tick_size: run.terms.tick_size,
                    tick_value: run.terms.tick_value,
                    cap: run.cap,
                    bar_count: series.bars.len(),
                    first_date: series.bars.first().map(|b| b.date),
                    last_date: series.bars.last().map(|b| b.date),
                    final_signal: run.signals.last().map_or(0, |s| s.value()),
                    final_position: run.positions.last().unwrap_or(0),
                    total_pnl: run.pnl.total(),
                });
                pnls.push(run.pnl);
            }
            Err(e) => {
                warn!(symbol = %series.symbol, error = %e, "rejecting instrument");
                rejected.push(RejectedInstrument {
                    symbol: series.symbol.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    rejected.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    let capital = config.backtest.starting_capital;
    let curves = aggregate(&pnls, sectors, capital);
    let summary = PerformanceSummary::compute(&curves);

    info!(
        instruments = reports.len(),
        rejected = rejected.len(),
        sectors = curves.sectors.len(),
        observations = summary.observations,
        annualized_return_pct = summary.annualized_return_pct,
        sharpe = summary.sharpe,
        sortino = summary.sortino,
        "backtest complete"
    );

    BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        dataset_hash: loaded.dataset_hash.clone(),
        starting_capital: capital,
        has_synthetic: loaded.has_synthetic,
        risk_budget_per_instrument: budget.per_instrument(),
        instruments: reports,
        rejected,
        unclassified: loaded.unclassified.clone(),
        curves,
        summary,
    }
}
