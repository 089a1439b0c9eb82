//! Per-instrument pipeline: price series → signal → position → PnL.
//!
//! Each instrument depends only on its own prices and the shared read-only
//! reference data, so instruments can run in any order or in parallel.

use chrono::NaiveDate;
use thiserror::Error;

use crate::contracts::{ContractSpecRegistry, ContractTerms, FallbackContract};
use crate::domain::{InstrumentPnl, PositionSeries, PriceBar, Sector, SignalSeries};
use crate::pnl::daily_pnl;
use crate::signals::SignalGenerator;
use crate::sizing::{PositionSizer, SectorCaps};
use crate::universe::SectorMap;

/// Reasons an instrument is kept out of the portfolio.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InstrumentError {
    #[error("'{symbol}': date {date} at row {index} does not follow {previous}")]
    NonMonotonicDates {
        symbol: String,
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("'{0}' has no sector classification")]
    Unclassified(String),
}

/// Reject a series whose dates are not strictly increasing.
pub fn validate_dates(symbol: &str, bars: &[PriceBar]) -> Result<(), InstrumentError> {
    for (index, pair) in bars.windows(2).enumerate() {
        if pair[1].date <= pair[0].date {
            return Err(InstrumentError::NonMonotonicDates {
                symbol: symbol.to_string(),
                index: index + 1,
                previous: pair[0].date,
                date: pair[1].date,
            });
        }
    }
    Ok(())
}

/// Everything computed for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentRun {
    pub symbol: String,
    pub sector: Sector,
    pub terms: ContractTerms,
    pub cap: u32,
    pub signals: SignalSeries,
    pub positions: PositionSeries,
    pub pnl: InstrumentPnl,
}

/// Static configuration shared by every instrument in a run.
pub struct InstrumentPipeline<'a> {
    registry: &'a ContractSpecRegistry,
    sectors: &'a SectorMap,
    signal: Box<dyn SignalGenerator + 'a>,
    sizer: Box<dyn PositionSizer + 'a>,
    caps: SectorCaps,
    fallback: FallbackContract,
}

impl<'a> InstrumentPipeline<'a> {
    pub fn new(
        registry: &'a ContractSpecRegistry,
        sectors: &'a SectorMap,
        signal: Box<dyn SignalGenerator + 'a>,
        sizer: Box<dyn PositionSizer + 'a>,
    ) -> Self {
        Self {
            registry,
            sectors,
            signal,
            sizer,
            caps: SectorCaps::default(),
            fallback: FallbackContract::default(),
        }
    }

    pub fn with_caps(mut self, caps: SectorCaps) -> Self {
        self.caps = caps;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackContract) -> Self {
        self.fallback = fallback;
        self
    }

    /// Contract terms for `symbol`, falling back when the registry lacks it.
    pub fn terms_for(&self, symbol: &str) -> ContractTerms {
        ContractTerms::resolve(self.registry, symbol, &self.fallback)
    }

    /// Run one instrument end to end.
    pub fn run(&self, symbol: &str, bars: &[PriceBar]) -> Result<InstrumentRun, InstrumentError> {
        let sector = self
            .sectors
            .sector_of(symbol)
            .ok_or_else(|| InstrumentError::Unclassified(symbol.to_string()))?;
        validate_dates(symbol, bars)?;

        let terms = self.terms_for(symbol);
        let cap = self.caps.cap_for(sector);
        let signals = self.signal.generate(bars);
        let positions = self.sizer.size(bars, &terms, cap);
        let pnl = daily_pnl(symbol, bars, &positions, &signals, &terms);

        Ok(InstrumentRun {
            symbol: symbol.to_string(),
            sector,
            terms,
            cap,
            signals,
            positions,
            pnl,
        })
    }
}
