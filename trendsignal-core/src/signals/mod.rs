//! Classifier output: the trend signal and its metrics snapshot.

pub mod action;

pub use action::{Confidence, SignalAction};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Direction of the supertrend band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
}

impl TrendDirection {
    /// `+1.0` for up, `-1.0` for down.
    pub fn as_f64(&self) -> f64 {
        match self {
            TrendDirection::Up => 1.0,
            TrendDirection::Down => -1.0,
        }
    }
}

/// Fast/slow EMA relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmaTrend {
    Bullish,
    Bearish,
}

/// Indicator values at the last bar of the classified series.
///
/// `None` means the indicator had not warmed up (insufficient history).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalMetrics {
    pub current_price: f64,
    pub supertrend_direction: Option<TrendDirection>,
    pub supertrend_value: Option<f64>,
    pub adx: Option<f64>,
    pub plus_di: Option<f64>,
    pub minus_di: Option<f64>,
    pub atr_pct: Option<f64>,
    pub drawdown_pct: f64,
    pub rally_pct: f64,
    pub recent_high: f64,
    pub recent_low: f64,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub ema_trend: Option<EmaTrend>,
    /// Minimum-move threshold after any volatility adjustment.
    pub min_threshold: f64,
    /// Severe-move threshold after any volatility adjustment.
    pub severe_threshold: f64,
    pub volatility_adjusted: bool,
}

impl SignalMetrics {
    /// Flatten into a name → value map for reporting.
    ///
    /// Undefined values are omitted. Direction and EMA tags are encoded as
    /// `+1` (up / bullish) and `-1` (down / bearish).
    pub fn as_map(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        map.insert("current_price".to_string(), self.current_price);
        map.insert("drawdown_pct".to_string(), self.drawdown_pct);
        map.insert("rally_pct".to_string(), self.rally_pct);
        map.insert("recent_high".to_string(), self.recent_high);
        map.insert("recent_low".to_string(), self.recent_low);
        map.insert("min_threshold".to_string(), self.min_threshold);
        map.insert("severe_threshold".to_string(), self.severe_threshold);
        map.insert(
            "volatility_adjusted".to_string(),
            if self.volatility_adjusted { 1.0 } else { 0.0 },
        );

        let optional = [
            ("supertrend_direction", self.supertrend_direction.map(|d| d.as_f64())),
            ("supertrend_value", self.supertrend_value),
            ("adx", self.adx),
            ("plus_di", self.plus_di),
            ("minus_di", self.minus_di),
            ("atr_pct", self.atr_pct),
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            (
                "ema_trend",
                self.ema_trend.map(|t| match t {
                    EmaTrend::Bullish => 1.0,
                    EmaTrend::Bearish => -1.0,
                }),
            ),
        ];
        for (name, value) in optional {
            if let Some(v) = value {
                map.insert(name.to_string(), v);
            }
        }
        map
    }
}

/// One classification result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSignal {
    pub action: SignalAction,
    pub confidence: Confidence,
    pub reason: String,
    pub metrics: SignalMetrics,
    /// Timestamp of the last bar the signal was computed from.
    pub evaluated_at: NaiveDateTime,
}
