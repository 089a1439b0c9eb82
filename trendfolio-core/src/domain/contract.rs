//! Contract specification: the mechanical terms of one futures contract.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tick size and big point value of an exchange-traded contract.
///
/// `tick_value` is derived once at construction and never recomputed, so
/// every reader sees exactly `tick_size * big_point_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawContractSpec", into = "RawContractSpec")]
pub struct ContractSpec {
    symbol: String,
    name: String,
    tick_size: f64,
    big_point_value: f64,
    tick_value: f64,
}

impl ContractSpec {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        tick_size: f64,
        big_point_value: f64,
    ) -> Result<Self, ContractError> {
        let symbol = symbol.into();
        if !(tick_size.is_finite() && tick_size > 0.0) {
            return Err(ContractError::InvalidTickSize { symbol, tick_size });
        }
        if !(big_point_value.is_finite() && big_point_value > 0.0) {
            return Err(ContractError::InvalidBigPointValue { symbol, big_point_value });
        }
        Ok(Self {
            symbol,
            name: name.into(),
            tick_size,
            big_point_value,
            tick_value: tick_size * big_point_value,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Minimum price increment.
    pub fn tick_size(&self) -> f64 {
        self.tick_size
    }

    /// Dollars per one full unit of price movement, per contract.
    pub fn big_point_value(&self) -> f64 {
        self.big_point_value
    }

    /// Dollars per one tick of price movement, per contract.
    pub fn tick_value(&self) -> f64 {
        self.tick_value
    }
}

/// Serialized form: the derived tick value is never read from input.
#[derive(Serialize, Deserialize)]
struct RawContractSpec {
    symbol: String,
    #[serde(default)]
    name: String,
    tick_size: f64,
    big_point_value: f64,
}

impl TryFrom<RawContractSpec> for ContractSpec {
    type Error = ContractError;

    fn try_from(raw: RawContractSpec) -> Result<Self, Self::Error> {
        ContractSpec::new(raw.symbol, raw.name, raw.tick_size, raw.big_point_value)
    }
}

impl From<ContractSpec> for RawContractSpec {
    fn from(spec: ContractSpec) -> Self {
        Self {
            symbol: spec.symbol,
            name: spec.name,
            tick_size: spec.tick_size,
            big_point_value: spec.big_point_value,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ContractError {
    #[error("contract '{symbol}': tick size must be positive and finite, got {tick_size}")]
    InvalidTickSize { symbol: String, tick_size: f64 },

    #[error("contract '{symbol}': big point value must be positive and finite, got {big_point_value}")]
    InvalidBigPointValue { symbol: String, big_point_value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_value_is_tick_size_times_bpv() {
        let es = ContractSpec::new("ES", "E-mini S&P 500", 0.25, 50.0).unwrap();
        assert_eq!(es.tick_value(), 12.5);
        assert_eq!(es.big_point_value(), 50.0);
    }

    #[test]
    fn rejects_non_positive_tick_size() {
        let err = ContractSpec::new("XX", "", 0.0, 50.0).unwrap_err();
        assert!(matches!(err, ContractError::InvalidTickSize { .. }));
    }

    #[test]
    fn rejects_nan_big_point_value() {
        let err = ContractSpec::new("XX", "", 0.25, f64::NAN).unwrap_err();
        assert!(matches!(err, ContractError::InvalidBigPointValue { .. }));
    }

    #[test]
    fn deserialization_validates_and_derives_tick_value() {
        let spec: ContractSpec =
            serde_json::from_str(r#"{"symbol":"CL","tick_size":0.01,"big_point_value":1000}"#)
                .unwrap();
        assert_eq!(spec.tick_value(), 0.01 * 1000.0);

        let bad = serde_json::from_str::<ContractSpec>(
            r#"{"symbol":"CL","tick_size":-0.01,"big_point_value":1000}"#,
        );
        assert!(bad.is_err());
    }
}
