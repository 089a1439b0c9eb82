//! Domain types for the trendfolio engine.

pub mod bar;
pub mod contract;
pub mod sector;
pub mod series;

pub use bar::{closes, PriceBar};
pub use contract::{ContractError, ContractSpec};
pub use sector::Sector;
pub use series::{EquityCurve, InstrumentPnl, PositionSeries, Signal, SignalSeries};
