//! Shared models for trade records.
//!
//! Contains the venue and side enums used by both the creation request and
//! the stored record, plus their wire names.

pub mod trade;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use trade::{TradeCreateRequest, TradeRecord, ValidationError};

/// Supported trading venues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Binance,
    Coinbase,
    Kraken,
}

impl Exchange {
    /// All supported venues.
    pub const ALL: [Exchange; 3] = [Self::Binance, Self::Coinbase, Self::Kraken];

    /// Returns the wire-format venue name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Binance => "binance",
            Exchange::Coinbase => "coinbase",
            Exchange::Kraken => "kraken",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|exchange| exchange.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError {
                kind: "exchange",
                value: s.to_string(),
            })
    }
}

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Returns the wire-format side name (`"BUY"` or `"SELL"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeSide {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("buy") {
            Ok(TradeSide::Buy)
        } else if s.eq_ignore_ascii_case("sell") {
            Ok(TradeSide::Sell)
        } else {
            Err(ParseEnumError {
                kind: "side",
                value: s.to_string(),
            })
        }
    }
}

/// Returned when a string names no known [`Exchange`] or [`TradeSide`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}
