use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Instrument class of a security.
///
/// Options share the warrant volatility profile and are folded into `Warrant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentClass {
    Stock,
    #[default]
    #[serde(alias = "option", alias = "options")]
    Warrant,
}

impl InstrumentClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentClass::Stock => "stock",
            InstrumentClass::Warrant => "warrant",
        }
    }
}

impl fmt::Display for InstrumentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for InstrumentClass {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stock" => Ok(InstrumentClass::Stock),
            "warrant" | "option" | "options" => Ok(InstrumentClass::Warrant),
            _ => Err(InstrumentError::UnknownInstrumentClass(s.to_string())),
        }
    }
}

/// Bar interval the indicator parameters are tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[default]
    #[serde(alias = "hour")]
    Hourly,
    #[serde(alias = "day")]
    Daily,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Hourly => "hourly",
            Timeframe::Daily => "daily",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" | "hour" => Ok(Timeframe::Hourly),
            "daily" | "day" => Ok(Timeframe::Daily),
            _ => Err(InstrumentError::UnknownTimeframe(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstrumentError {
    #[error("unknown instrument class '{0}' (expected stock, warrant or option)")]
    UnknownInstrumentClass(String),

    #[error("unknown timeframe '{0}' (expected hourly or daily)")]
    UnknownTimeframe(String),
}
