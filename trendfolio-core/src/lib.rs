//! Trendfolio Core — contract reference data, signals, sizing, PnL, aggregation, metrics.
//!
//! The engine is a pure batch computation:
//! - Reference data (contract specs, sector map)
//! - Moving-average crossover signal with burn-in mask
//! - Volatility-targeted position sizing with per-sector caps
//! - Daily PnL from the previous bar's signal
//! - Sector and portfolio aggregation over a union date axis
//! - Annualized return, Sharpe and Sortino

pub mod contracts;
pub mod domain;
pub mod indicators;
pub mod metrics;
pub mod pipeline;
pub mod pnl;
pub mod portfolio;
pub mod signals;
pub mod sizing;
pub mod universe;

pub use contracts::{ContractSource, ContractSpecRegistry, ContractTerms, FallbackContract};
pub use metrics::PerformanceSummary;
pub use pipeline::{InstrumentError, InstrumentPipeline, InstrumentRun};
pub use portfolio::{aggregate, PortfolioCurves};
pub use universe::SectorMap;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything shared across worker threads is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::PriceBar>();
        require_sync::<domain::PriceBar>();
        require_send::<domain::ContractSpec>();
        require_sync::<domain::ContractSpec>();
        require_send::<domain::SignalSeries>();
        require_sync::<domain::SignalSeries>();
        require_send::<domain::PositionSeries>();
        require_sync::<domain::PositionSeries>();
        require_send::<domain::InstrumentPnl>();
        require_sync::<domain::InstrumentPnl>();

        require_send::<ContractSpecRegistry>();
        require_sync::<ContractSpecRegistry>();
        require_send::<SectorMap>();
        require_sync::<SectorMap>();
        require_send::<ContractTerms>();
        require_sync::<ContractTerms>();

        require_send::<InstrumentRun>();
        require_sync::<InstrumentRun>();
        require_send::<InstrumentError>();
        require_sync::<InstrumentError>();
        require_send::<PortfolioCurves>();
        require_sync::<PortfolioCurves>();

        require_send::<signals::MaCrossover>();
        require_sync::<signals::MaCrossover>();
        require_send::<sizing::VolatilityTargetSizer>();
        require_sync::<sizing::VolatilityTargetSizer>();
    }

    /// The signal trait only sees the instrument's own bars.
    #[test]
    fn signal_generator_sees_only_prices() {
        fn _check_trait_object_builds(
            sig: &dyn signals::SignalGenerator,
            bars: &[domain::PriceBar],
        ) -> domain::SignalSeries {
            sig.generate(bars)
        }
    }

    /// The pipeline can be shared by reference across worker threads.
    #[test]
    fn pipeline_is_shareable() {
        fn require_sync<T: Sync>() {}
        require_sync::<InstrumentPipeline<'static>>();
    }
}
