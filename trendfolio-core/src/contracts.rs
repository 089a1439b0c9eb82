//! Contract specification registry and contract resolution.
//!
//! The registry is an explicitly constructed, immutable lookup table that is
//! handed to the engine at startup. It only reports presence or absence of a
//! symbol. Callers that need terms for an unknown symbol go through
//! [`ContractTerms::resolve`], which applies an explicit [`FallbackContract`]
//! and records that it did so.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::domain::{ContractError, ContractSpec};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),

    #[error("duplicate contract spec for '{0}'")]
    DuplicateSymbol(String),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("read contracts file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse contracts TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Immutable symbol → contract spec table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractSpecRegistry {
    specs: BTreeMap<String, ContractSpec>,
}

#[derive(Deserialize)]
struct ContractsFile {
    #[serde(default, rename = "contract")]
    contracts: Vec<ContractSpec>,
}

impl ContractSpecRegistry {
    /// Build a registry, rejecting duplicate symbols.
    pub fn new(specs: impl IntoIterator<Item = ContractSpec>) -> Result<Self, RegistryError> {
        let mut map = BTreeMap::new();
        for spec in specs {
            let symbol = spec.symbol().to_string();
            if map.insert(symbol.clone(), spec).is_some() {
                return Err(RegistryError::DuplicateSymbol(symbol));
            }
        }
        Ok(Self { specs: map })
    }

    /// Load a registry from a TOML file of `[[contract]]` tables.
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a registry from TOML:
    ///
    /// ```toml
    /// [[contract]]
    /// symbol = "ES"
    /// name = "E-mini S&P 500"
    /// tick_size = 0.25
    /// big_point_value = 50.0
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, RegistryError> {
        let file: ContractsFile = toml::from_str(content)?;
        Self::new(file.contracts)
    }

    /// Look up a contract spec by symbol.
    pub fn lookup(&self, symbol: &str) -> Result<&ContractSpec, RegistryError> {
        self.specs
            .get(symbol)
            .ok_or_else(|| RegistryError::UnknownSymbol(symbol.to_string()))
    }

    /// Dollar value of a one-tick move for `symbol`.
    pub fn tick_value(&self, symbol: &str) -> Result<f64, RegistryError> {
        self.lookup(symbol).map(ContractSpec::tick_value)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Specs in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = &ContractSpec> {
        self.specs.values()
    }

    /// The reference futures contract table.
    pub fn reference() -> Self {
        let specs = REFERENCE_CONTRACTS.iter().map(|&(symbol, name, tick, bpv)| {
            ContractSpec::new(symbol, name, tick, bpv)
                .expect("reference contract table has positive tick sizes and point values")
        });
        Self::new(specs).expect("reference contract table has unique symbols")
    }
}

/// Terms used for an instrument whose symbol is not in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackContract {
    pub tick_size: f64,
    pub tick_value: f64,
}

impl Default for FallbackContract {
    fn default() -> Self {
        Self { tick_size: 0.01, tick_value: 10.0 }
    }
}

/// Where an instrument's contract terms came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractSource {
    Registry,
    Fallback,
}

/// Resolved tick size and tick value for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContractTerms {
    pub tick_size: f64,
    pub tick_value: f64,
    pub source: ContractSource,
}

impl ContractTerms {
    pub fn from_spec(spec: &ContractSpec) -> Self {
        Self {
            tick_size: spec.tick_size(),
            tick_value: spec.tick_value(),
            source: ContractSource::Registry,
        }
    }

    /// Registry terms for `symbol`, or the fallback terms tagged as such.
    pub fn resolve(
        registry: &ContractSpecRegistry,
        symbol: &str,
        fallback: &FallbackContract,
    ) -> Self {
        match registry.lookup(symbol) {
            Ok(spec) => Self::from_spec(spec),
            Err(_) => Self {
                tick_size: fallback.tick_size,
                tick_value: fallback.tick_value,
                source: ContractSource::Fallback,
            },
        }
    }

    /// Dollars per one full unit of price movement: tick value / tick size.
    pub fn price_multiplier(&self) -> f64 {
        self.tick_value / self.tick_size
    }

    pub fn is_fallback(&self) -> bool {
        self.source == ContractSource::Fallback
    }
}

/// (symbol, name, tick size, big point value)
const REFERENCE_CONTRACTS: &[(&str, &str, f64, f64)] = &[
    // Equity indices
    ("ES", "E-mini S&P 500", 0.25, 50.0),
    ("MES", "Micro E-mini S&P 500", 0.25, 5.0),
    ("NQ", "E-mini NASDAQ-100", 0.25, 20.0),
    ("MNQ", "Micro E-mini Nasdaq-100", 0.25, 2.0),
    ("YM", "E-mini Dow Futures", 1.0, 5.0),
    ("MYM", "Micro E-mini Dow", 1.0, 0.5),
    ("RTY", "E-mini Russell 2000 Idx", 0.10, 50.0),
    ("M2K", "Micro E-mini Russell 2000", 0.10, 5.0),
    ("EMD", "E-mini S&P MidCap 400", 0.10, 100.0),
    ("SP", "S&P 500 (Big)", 0.10, 250.0),
    ("NIY", "Nikkei 225 Yen Denominated", 5.0, 500.0),
    ("NK", "Nikkei 225 USD", 5.0, 5.0),
    // Metals
    ("GC", "Gold", 0.10, 100.0),
    ("SI", "Silver", 0.005, 5000.0),
    ("HG", "Copper", 0.0005, 25000.0),
    ("PL", "Platinum", 0.10, 50.0),
    // Energies
    ("CL", "Crude Oil", 0.01, 1000.0),
    ("QM", "E-mini Crude Oil", 0.025, 500.0),
    ("NG", "Natural Gas", 0.001, 10000.0),
    ("QN", "miNY Natural Gas", 0.005, 2500.0),
    ("RB", "NY Harbor RBOB Gasoline", 0.0001, 42000.0),
    ("HO", "Heating Oil", 0.0001, 42000.0),
    ("QH", "E-mini Heating Oil", 0.0001, 42000.0),
    ("QU", "E-mini Gasoline", 0.0001, 42000.0),
    // Interest rates
    ("US", "30 Yr U.S. Treasury Bonds", 0.03125, 1000.0),
    ("TY", "10 Yr U.S. Treasury Notes", 0.015625, 1000.0),
    ("FV", "5 Yr U.S. Treasury Notes", 0.0078125, 1000.0),
    ("TU", "2 Year U.S. Treasury Notes", 0.00390625, 2000.0),
    ("ED", "Eurodollar", 0.005, 2500.0),
    ("FF", "30 Day Federal Funds", 0.005, 4167.0),
    // Currencies
    ("AD", "Australian Dollar", 0.0001, 100000.0),
    ("BP", "British Pound", 0.0001, 62500.0),
    ("CD", "Canadian Dollar", 0.0001, 100000.0),
    ("EC", "Euro FX", 0.0001, 125000.0),
    ("E7", "E-Mini Euro FX", 0.0001, 62500.0),
    ("JY", "Japanese Yen", 0.000001, 12500000.0),
    ("J7", "E-Mini Japanese Yen", 0.000001, 6250000.0),
    ("SF", "Swiss Franc", 0.0001, 125000.0),
    ("DX", "U.S. Dollar Index", 0.005, 1000.0),
    ("MP1", "Mexican Peso", 0.00001, 500000.0),
    ("NE1", "New Zealand Dollar", 0.0001, 100000.0),
    // Agriculture and livestock
    ("C", "Corn", 0.25, 50.0),
    ("S", "Soybeans", 0.25, 50.0),
    ("W", "Wheat", 0.25, 50.0),
    ("KW", "Hard Red Winter Wheat", 0.25, 50.0),
    ("KC", "Coffee C", 0.05, 375.0),
    ("SB", "Sugar No. 11", 0.01, 1120.0),
    ("CC", "Cocoa", 1.0, 10.0),
    ("CT", "Cotton No. 2", 0.01, 500.0),
    ("LC", "Live Cattle", 0.025, 400.0),
    ("LH", "Lean Hogs", 0.025, 400.0),
    ("FC", "Feeder Cattle", 0.025, 200.0),
    ("OJ", "Frozen Concentrated Orange Juice", 0.05, 150.0),
    ("BO", "Soybean Oil", 0.01, 600.0),
    ("SM", "Soybean Meal", 0.1, 100.0),
    ("RR", "Rough Rice", 0.01, 2000.0),
    ("O", "Oats", 0.25, 50.0),
];
