//! Sector classification of the reference futures universe.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the six sector groups.
///
/// The declaration order is the canonical reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sector {
    #[serde(rename = "Equity Indices")]
    EquityIndices,
    #[serde(rename = "Rates and Bonds")]
    RatesAndBonds,
    #[serde(rename = "Metals")]
    Metals,
    #[serde(rename = "Energies")]
    Energies,
    #[serde(rename = "Agriculture")]
    Agriculture,
    #[serde(rename = "Currencies")]
    Currencies,
}

impl Sector {
    pub const ALL: [Sector; 6] = [
        Sector::EquityIndices,
        Sector::RatesAndBonds,
        Sector::Metals,
        Sector::Energies,
        Sector::Agriculture,
        Sector::Currencies,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Sector::EquityIndices => "Equity Indices",
            Sector::RatesAndBonds => "Rates and Bonds",
            Sector::Metals => "Metals",
            Sector::Energies => "Energies",
            Sector::Agriculture => "Agriculture",
            Sector::Currencies => "Currencies",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sector::ALL
            .iter()
            .copied()
            .find(|sector| sector.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown sector '{s}'"))
    }
}
