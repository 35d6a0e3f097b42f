//! Volatility-dependent widening of the move thresholds.
//!
//! When the dispersion of the last 20 returns exceeds 1.5x the dispersion of
//! the last 100, both thresholds are multiplied by 1.25.

use crate::config::IndicatorConfig;
use crate::indicators::{returns, sample_std, tail};

pub const RECENT_RETURNS: usize = 20;
pub const HISTORICAL_RETURNS: usize = 100;
pub const SPIKE_RATIO: f64 = 1.5;
pub const WIDENING_FACTOR: f64 = 1.25;

/// Move thresholds in effect for one classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveThresholds {
    pub min_move: f64,
    pub severe_move: f64,
    pub adjusted: bool,
}

impl MoveThresholds {
    pub fn from_config(config: &IndicatorConfig) -> Self {
        Self {
            min_move: config.min_threshold,
            severe_move: config.severe_threshold,
            adjusted: false,
        }
    }
}

/// True when recent return dispersion is abnormally high.
///
/// Needs at least two returns; shorter histories never count as a spike.
pub fn volatility_spike(closes: &[f64]) -> bool {
    let rets = returns(closes);
    let recent = sample_std(tail(&rets, RECENT_RETURNS));
    let historical = sample_std(tail(&rets, HISTORICAL_RETURNS));
    match (recent, historical) {
        (Some(recent), Some(historical)) => recent > SPIKE_RATIO * historical,
        _ => false,
    }
}

/// Thresholds for `closes` under `config`, widened on a volatility spike when
/// dynamic thresholds are enabled.
pub fn effective_thresholds(closes: &[f64], config: &IndicatorConfig) -> MoveThresholds {
    let base = MoveThresholds::from_config(config);
    if !config.use_dynamic_thresholds || !volatility_spike(closes) {
        return base;
    }
    MoveThresholds {
        min_move: base.min_move * WIDENING_FACTOR,
        severe_move: base.severe_move * WIDENING_FACTOR,
        adjusted: true,
    }
}
