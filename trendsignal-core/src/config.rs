//! Indicator parameter bundles per (timeframe, instrument class).
//!
//! Trading hours are 08:00-22:00, so 14 hourly bars make one trading day and
//! the hourly lookback of 140 bars spans two trading weeks.
//!
//! Warrants and options move far more than the underlying, so their move
//! thresholds are four times the stock thresholds.

use crate::domain::{InstrumentClass, Timeframe};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed-shape parameter bundle consumed by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub supertrend_atr_period: usize,
    pub supertrend_multiplier: f64,
    pub adx_period: usize,
    pub atr_period: usize,
    /// Drawdown/rally window in bars.
    pub lookback_window: usize,
    /// Minimum move in percent.
    pub min_threshold: f64,
    /// Severe move in percent.
    pub severe_threshold: f64,
    pub min_adx_strength: f64,
    pub use_ema_confirmation: bool,
    pub ema_fast_period: usize,
    pub ema_slow_period: usize,
    pub use_dynamic_thresholds: bool,
    /// Quantile used to describe "high volatility" in reports. The threshold
    /// widening itself uses the recent/historical dispersion ratio.
    pub volatility_quantile: f64,
}

pub const WARRANT_HOURLY: IndicatorConfig = IndicatorConfig {
    supertrend_atr_period: 14,
    supertrend_multiplier: 3.5,
    adx_period: 14,
    atr_period: 14,
    lookback_window: 140,
    min_threshold: 20.0,
    severe_threshold: 30.0,
    min_adx_strength: 25.0,
    use_ema_confirmation: true,
    ema_fast_period: 14,
    ema_slow_period: 42,
    use_dynamic_thresholds: true,
    volatility_quantile: 0.75,
};

pub const WARRANT_DAILY: IndicatorConfig = IndicatorConfig {
    supertrend_atr_period: 10,
    supertrend_multiplier: 3.0,
    adx_period: 14,
    atr_period: 14,
    lookback_window: 10,
    min_threshold: 20.0,
    severe_threshold: 30.0,
    min_adx_strength: 25.0,
    use_ema_confirmation: true,
    ema_fast_period: 5,
    ema_slow_period: 13,
    use_dynamic_thresholds: true,
    volatility_quantile: 0.75,
};

pub const STOCK_HOURLY: IndicatorConfig = IndicatorConfig {
    supertrend_atr_period: 14,
    supertrend_multiplier: 3.0,
    adx_period: 14,
    atr_period: 14,
    lookback_window: 140,
    min_threshold: 5.0,
    severe_threshold: 10.0,
    min_adx_strength: 20.0,
    use_ema_confirmation: true,
    ema_fast_period: 14,
    ema_slow_period: 42,
    use_dynamic_thresholds: true,
    volatility_quantile: 0.75,
};

pub const STOCK_DAILY: IndicatorConfig = IndicatorConfig {
    supertrend_atr_period: 10,
    supertrend_multiplier: 2.5,
    adx_period: 14,
    atr_period: 14,
    lookback_window: 20,
    min_threshold: 5.0,
    severe_threshold: 10.0,
    min_adx_strength: 20.0,
    use_ema_confirmation: true,
    ema_fast_period: 5,
    ema_slow_period: 13,
    use_dynamic_thresholds: true,
    volatility_quantile: 0.75,
};

impl Default for IndicatorConfig {
    /// Hourly warrant bundle, the fallback for unrecognised profiles.
    fn default() -> Self {
        WARRANT_HOURLY
    }
}

impl IndicatorConfig {
    /// Bundle for a (timeframe, instrument class) pair.
    pub fn resolve(timeframe: Timeframe, instrument: InstrumentClass) -> Self {
        match (timeframe, instrument) {
            (Timeframe::Hourly, InstrumentClass::Warrant) => WARRANT_HOURLY,
            (Timeframe::Daily, InstrumentClass::Warrant) => WARRANT_DAILY,
            (Timeframe::Hourly, InstrumentClass::Stock) => STOCK_HOURLY,
            (Timeframe::Daily, InstrumentClass::Stock) => STOCK_DAILY,
        }
    }

    /// Lenient lookup from free-form names.
    ///
    /// Unrecognised names fall back to the default bundle (hourly warrant)
    /// as a whole, never to a mix of one parsed and one defaulted half.
    pub fn resolve_str(timeframe: &str, instrument: &str) -> Self {
        match (timeframe.parse::<Timeframe>(), instrument.parse::<InstrumentClass>()) {
            (Ok(tf), Ok(class)) => Self::resolve(tf, class),
            _ => {
                tracing::debug!(
                    timeframe,
                    instrument,
                    "unrecognised profile, using default indicator config"
                );
                Self::default()
            }
        }
    }

    /// Longest lookback any indicator in the bundle needs.
    pub fn max_period(&self) -> usize {
        let mut periods = vec![
            self.supertrend_atr_period,
            2 * self.adx_period,
            self.atr_period,
            self.lookback_window,
        ];
        if self.use_ema_confirmation {
            periods.push(self.ema_fast_period);
            periods.push(self.ema_slow_period);
        }
        periods.into_iter().max().unwrap_or(0)
    }

    /// Bars needed for every indicator to be defined at the last bar.
    pub fn min_bars(&self) -> usize {
        self.max_period() + 1
    }

    /// Reject bundles the indicators cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("supertrend_atr_period", self.supertrend_atr_period),
            ("adx_period", self.adx_period),
            ("atr_period", self.atr_period),
            ("lookback_window", self.lookback_window),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(ConfigError::ZeroPeriod(name));
            }
        }
        if self.use_ema_confirmation && (self.ema_fast_period == 0 || self.ema_slow_period == 0) {
            return Err(ConfigError::ZeroPeriod("ema_period"));
        }
        if !(self.supertrend_multiplier.is_finite() && self.supertrend_multiplier > 0.0) {
            return Err(ConfigError::InvalidValue {
                name: "supertrend_multiplier",
                value: self.supertrend_multiplier,
            });
        }
        if !(self.min_threshold >= 0.0 && self.severe_threshold >= self.min_threshold) {
            return Err(ConfigError::InvalidValue {
                name: "severe_threshold",
                value: self.severe_threshold,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{0} must be at least 1")]
    ZeroPeriod(&'static str),

    #[error("invalid value {value} for {name}")]
    InvalidValue { name: &'static str, value: f64 },
}
