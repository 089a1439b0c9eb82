//! Trendfolio Runner — configuration, price loading, parallel portfolio runs, export.
//!
//! This crate builds on `trendfolio-core` to provide:
//! - TOML configuration with deterministic run ids
//! - Per-symbol CSV loading with a synthetic fallback
//! - Parallel per-instrument pipelines merged into portfolio curves
//! - JSON and CSV artifacts

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use config::{BacktestConfig, ConfigError, RunId};
pub use data_loader::{
    load_prices, DataSource, LoadError, LoadOptions, LoadedData, PriceSeries, RejectedInstrument,
};
pub use export::{load_artifacts, save_artifacts};
pub use runner::{run_backtest, run_portfolio, BacktestResult, InstrumentReport, RunError};
