//! TOML backtest configuration.
//!
//! ```toml
//! [backtest]
//! starting_capital = 10000000.0
//! risk_target_pct = 0.003
//! # instrument_count = 40
//!
//! [signal]
//! short_window = 20
//! long_window = 120
//!
//! [sizing]
//! vol_window = 40
//! currencies_cap = 4
//! equity_indices_cap = 1
//! default_cap = 15
//!
//! [fallback]
//! tick_size = 0.01
//! tick_value = 10.0
//!
//! [data]
//! # contracts = "contracts.toml"
//! # sectors = "sectors.toml"
//! ```
//!
//! Every section and field is optional; missing values take the defaults above.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use trendfolio_core::contracts::{ContractSpecRegistry, FallbackContract, RegistryError};
use trendfolio_core::signals::MaCrossover;
use trendfolio_core::sizing::{RiskBudget, SectorCaps, VolatilityTargetSizer};
use trendfolio_core::universe::{SectorMap, SectorMapError};

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("contract specs: {0}")]
    Contracts(#[from] RegistryError),

    #[error("sector map: {0}")]
    Sectors(#[from] SectorMapError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSection {
    pub starting_capital: f64,
    /// Fraction of capital risked across the whole portfolio per day.
    pub risk_target_pct: f64,
    /// Instrument count N in `R = total / sqrt(N)`. Defaults to the size of
    /// the classified universe, whatever data happens to be present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument_count: Option<usize>,
}

impl Default for BacktestSection {
    fn default() -> Self {
        Self {
            starting_capital: 10_000_000.0,
            risk_target_pct: 0.003,
            instrument_count: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalSection {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for SignalSection {
    fn default() -> Self {
        Self {
            short_window: MaCrossover::DEFAULT_SHORT_WINDOW,
            long_window: MaCrossover::DEFAULT_LONG_WINDOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingSection {
    pub vol_window: usize,
    pub currencies_cap: u32,
    pub equity_indices_cap: u32,
    pub default_cap: u32,
}

impl Default for SizingSection {
    fn default() -> Self {
        let caps = SectorCaps::default();
        Self {
            vol_window: VolatilityTargetSizer::DEFAULT_VOL_WINDOW,
            currencies_cap: caps.currencies,
            equity_indices_cap: caps.equity_indices,
            default_cap: caps.default,
        }
    }
}

impl SizingSection {
    pub fn caps(&self) -> SectorCaps {
        SectorCaps {
            currencies: self.currencies_cap,
            equity_indices: self.equity_indices_cap,
            default: self.default_cap,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// Contract spec override file; the reference table is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contracts: Option<PathBuf>,
    /// Sector map override file; the reference classification is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sectors: Option<PathBuf>,
}

/// Complete configuration of a portfolio backtest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    pub signal: SignalSection,
    pub sizing: SizingSection,
    pub fallback: FallbackContract,
    pub data: DataSection,
}

impl BacktestConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bt = &self.backtest;
        if !(bt.starting_capital.is_finite() && bt.starting_capital > 0.0) {
            return Err(invalid("starting_capital must be positive"));
        }
        if !(bt.risk_target_pct.is_finite() && bt.risk_target_pct > 0.0) {
            return Err(invalid("risk_target_pct must be positive"));
        }
        if bt.instrument_count == Some(0) {
            return Err(invalid("instrument_count must be at least 1"));
        }
        if self.signal.short_window == 0 || self.signal.long_window == 0 {
            return Err(invalid("signal windows must be at least 1"));
        }
        if self.sizing.vol_window == 0 {
            return Err(invalid("vol_window must be at least 1"));
        }
        let fb = &self.fallback;
        if !(fb.tick_size.is_finite() && fb.tick_size > 0.0) {
            return Err(invalid("fallback tick_size must be positive"));
        }
        if !(fb.tick_value.is_finite() && fb.tick_value > 0.0) {
            return Err(invalid("fallback tick_value must be positive"));
        }
        Ok(())
    }

    /// Total daily dollar risk across the portfolio.
    pub fn total_risk_budget(&self) -> f64 {
        self.backtest.starting_capital * self.backtest.risk_target_pct
    }

    /// Risk budget split across a universe of `universe` symbols, unless N is pinned.
    pub fn risk_budget(&self, universe: usize) -> RiskBudget {
        let n = self.backtest.instrument_count.unwrap_or(universe);
        RiskBudget::new(self.total_risk_budget(), n)
    }

    pub fn signal_generator(&self) -> MaCrossover {
        MaCrossover::new(self.signal.short_window, self.signal.long_window)
    }

    pub fn sizer(&self, universe: usize) -> VolatilityTargetSizer {
        let budget = self.risk_budget(universe).per_instrument();
        VolatilityTargetSizer::new(budget, self.sizing.vol_window)
    }

    /// Contract registry: the override file if configured, else the reference table.
    pub fn load_contracts(&self) -> Result<ContractSpecRegistry, ConfigError> {
        match &self.data.contracts {
            Some(path) => Ok(ContractSpecRegistry::from_file(path)?),
            None => Ok(ContractSpecRegistry::reference()),
        }
    }

    /// Sector map: the override file if configured, else the reference map.
    pub fn load_sectors(&self) -> Result<SectorMap, ConfigError> {
        match &self.data.sectors {
            Some(path) => Ok(SectorMap::from_file(path)?),
            None => Ok(SectorMap::reference()),
        }
    }

    /// Computes a deterministic hash ID for this configuration.
    pub fn run_id(&self) -> RunId {
        // Plain data with string keys; serialization cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Invalid(msg.to_string())
}
