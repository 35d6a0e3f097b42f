//! Bar: the fundamental market data unit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV price bar for a single security at a single timestamp.
///
/// Hourly and daily series share the same representation; daily bars carry
/// midnight as their time of day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: u64,
}

impl Bar {
    /// Midpoint of the bar's range, `(high + low) / 2`.
    pub fn mid(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// Returns true if any OHLC field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// Basic OHLC sanity check: high >= low, high >= open/close, low <= open/close,
    /// strictly positive prices.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.low > 0.0
    }
}

/// Contract violations in a bar series handed to the classifier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("bar series is empty")]
    Empty,

    #[error("bar {index} has a non-finite price")]
    NonFinite { index: usize },

    #[error("bar {index} is malformed (high {high} / low {low} do not bound open/close or prices are not positive)")]
    Malformed { index: usize, high: f64, low: f64 },

    #[error("bar {index} timestamp {current} does not follow {previous}")]
    NonIncreasingTimestamp {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },
}

/// Validate a bar series: non-empty, every bar sane, timestamps strictly increasing.
pub fn validate_series(bars: &[Bar]) -> Result<(), BarError> {
    if bars.is_empty() {
        return Err(BarError::Empty);
    }

    for (index, bar) in bars.iter().enumerate() {
        if bar.is_void() {
            return Err(BarError::NonFinite { index });
        }
        if !bar.is_sane() {
            return Err(BarError::Malformed {
                index,
                high: bar.high,
                low: bar.low,
            });
        }
        if index > 0 {
            let previous = bars[index - 1].timestamp;
            if bar.timestamp <= previous {
                return Err(BarError::NonIncreasingTimestamp {
                    index,
                    previous,
                    current: bar.timestamp,
                });
            }
        }
    }

    Ok(())
}
