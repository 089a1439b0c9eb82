//! Sector classification: which sector each symbol belongs to.
//!
//! Stored as a TOML table of sector name → member symbols. A symbol belongs
//! to at most one sector; symbols absent from the map are excluded from
//! portfolio aggregation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::domain::Sector;

#[derive(Debug, Error)]
pub enum SectorMapError {
    #[error("unknown sector name '{0}'")]
    UnknownSector(String),

    #[error("symbol '{symbol}' listed in both {first} and {second}")]
    DuplicateSymbol { symbol: String, first: Sector, second: Sector },

    #[error("read sectors file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse sectors TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Immutable symbol → sector classification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorMap {
    by_symbol: BTreeMap<String, Sector>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SectorsFile {
    sectors: BTreeMap<String, Vec<String>>,
}

impl SectorMap {
    /// Build from (sector, symbols) groups, rejecting symbols in two sectors.
    pub fn new<I, S>(groups: I) -> Result<Self, SectorMapError>
    where
        I: IntoIterator<Item = (Sector, Vec<S>)>,
        S: Into<String>,
    {
        let mut by_symbol = BTreeMap::new();
        for (sector, symbols) in groups {
            for symbol in symbols {
                let symbol = symbol.into();
                if let Some(&first) = by_symbol.get(&symbol) {
                    if first != sector {
                        return Err(SectorMapError::DuplicateSymbol {
                            symbol,
                            first,
                            second: sector,
                        });
                    }
                    continue;
                }
                by_symbol.insert(symbol, sector);
            }
        }
        Ok(Self { by_symbol })
    }

    /// Load a classification from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, SectorMapError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a classification from TOML:
    ///
    /// ```toml
    /// [sectors]
    /// "Equity Indices" = ["ES", "NQ"]
    /// Metals = ["GC"]
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, SectorMapError> {
        let file: SectorsFile = toml::from_str(content)?;
        let mut groups = Vec::with_capacity(file.sectors.len());
        for (name, symbols) in file.sectors {
            let sector = name
                .parse::<Sector>()
                .map_err(|_| SectorMapError::UnknownSector(name.clone()))?;
            groups.push((sector, symbols));
        }
        Self::new(groups)
    }

    /// Sector of `symbol`, or `None` if unclassified.
    pub fn sector_of(&self, symbol: &str) -> Option<Sector> {
        self.by_symbol.get(symbol).copied()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.by_symbol.contains_key(symbol)
    }

    /// Symbols of one sector, in symbol order.
    pub fn symbols_in(&self, sector: Sector) -> Vec<&str> {
        self.by_symbol
            .iter()
            .filter(|(_, s)| **s == sector)
            .map(|(sym, _)| sym.as_str())
            .collect()
    }

    /// All classified symbols, in symbol order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.by_symbol.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }

    /// The reference six-sector classification of the futures universe.
    pub fn reference() -> Self {
        let groups: [(Sector, &[&str]); 6] = [
            (
                Sector::EquityIndices,
                &[
                    "ES", "NQ", "YM", "RTY", "EMD", "M2K", "MES", "MNQ", "MYM", "SP", "NK", "NIY",
                    "DAX", "FTSE", "NKY", "STXE",
                ],
            ),
            (
                Sector::RatesAndBonds,
                &[
                    "US", "TY", "FV", "TU", "ZN", "ZB", "ZT", "ZF", "ED", "FF", "FGBL", "CONF",
                    "JGB", "FGBM", "FGBX", "FGBS",
                ],
            ),
            (Sector::Metals, &["GC", "SI", "HG", "PL", "PA"]),
            (Sector::Energies, &["CL", "QM", "NG", "RB", "HO", "QH", "QU"]),
            (Sector::Agriculture, &["C", "S", "W", "SB"]),
            (
                Sector::Currencies,
                &["AD", "CD", "EC", "BP", "JY", "MP1", "NE1", "SF", "DX"],
            ),
        ];
        let by_symbol = groups
            .iter()
            .flat_map(|(sector, symbols)| symbols.iter().map(|s| (s.to_string(), *sector)))
            .collect();
        Self { by_symbol }
    }
}
