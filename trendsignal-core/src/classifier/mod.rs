//! Trend signal classifier.
//!
//! `classify` runs every indicator over the full bar history, reads the value
//! at the last bar and feeds the readings through the decision rule in
//! [`decision`]. The call is deterministic and holds no state between calls.

pub mod decision;
pub mod moves;
pub mod thresholds;

pub use decision::{decide, Decision, Observation};
pub use moves::{measure, PriceMove};
pub use thresholds::{effective_thresholds, volatility_spike, MoveThresholds};

use crate::config::{ConfigError, IndicatorConfig};
use crate::domain::{validate_series, Bar, BarError};
use crate::indicators::{
    atr_percent, directional_index, ema_of_series, last_defined, Supertrend,
};
use crate::signals::{EmaTrend, SignalMetrics, TrendSignal};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    #[error("invalid bar series: {0}")]
    Bars(#[from] BarError),

    #[error("invalid indicator config: {0}")]
    Config(#[from] ConfigError),
}

/// Classify the last bar of `bars` under `config`.
///
/// Histories shorter than [`IndicatorConfig::min_bars`] are not an error:
/// indicators that have not warmed up are reported as `None` and the
/// decision falls through to HOLD / LOW.
pub fn classify(bars: &[Bar], config: &IndicatorConfig) -> Result<TrendSignal, ClassifyError> {
    config.validate()?;
    validate_series(bars)?;

    // validate_series rejects empty input.
    let Some(last) = bars.last() else {
        return Err(BarError::Empty.into());
    };

    let st = Supertrend::new(config.supertrend_atr_period, config.supertrend_multiplier)
        .series(bars);
    let di = directional_index(bars, config.adx_period);
    let price_move = measure(bars, config.lookback_window).ok_or(BarError::Empty)?;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let thresholds = effective_thresholds(&closes, config);

    let observation = Observation {
        direction: st.last_direction(),
        adx: last_defined(&di.adx),
        plus_di: last_defined(&di.plus_di),
        minus_di: last_defined(&di.minus_di),
        drawdown_pct: price_move.drawdown_pct,
        rally_pct: price_move.rally_pct,
    };
    let decision = decide(&observation, &thresholds, config.min_adx_strength);

    let (ema_fast, ema_slow) = if config.use_ema_confirmation {
        (
            last_defined(&ema_of_series(&closes, config.ema_fast_period)),
            last_defined(&ema_of_series(&closes, config.ema_slow_period)),
        )
    } else {
        (None, None)
    };
    let ema_trend = match (ema_fast, ema_slow) {
        (Some(fast), Some(slow)) if fast > slow => Some(EmaTrend::Bullish),
        (Some(_), Some(_)) => Some(EmaTrend::Bearish),
        _ => None,
    };

    let mut reason = decision.reason;
    if decision.action.is_actionable() {
        if let Some(suffix) = ema_note(decision.action.is_sell(), ema_trend) {
            reason.push_str(suffix);
        }
    }

    tracing::debug!(
        action = %decision.action,
        confidence = ?decision.confidence,
        bars = bars.len(),
        adjusted = thresholds.adjusted,
        "classified"
    );

    Ok(TrendSignal {
        action: decision.action,
        confidence: decision.confidence,
        reason,
        metrics: SignalMetrics {
            current_price: last.close,
            supertrend_direction: observation.direction,
            supertrend_value: last_defined(&st.value),
            adx: observation.adx,
            plus_di: observation.plus_di,
            minus_di: observation.minus_di,
            atr_pct: atr_percent(bars, config.atr_period),
            drawdown_pct: price_move.drawdown_pct,
            rally_pct: price_move.rally_pct,
            recent_high: price_move.recent_high,
            recent_low: price_move.recent_low,
            ema_fast,
            ema_slow,
            ema_trend,
            min_threshold: thresholds.min_move,
            severe_threshold: thresholds.severe_move,
            volatility_adjusted: thresholds.adjusted,
        },
        evaluated_at: last.timestamp,
    })
}

fn ema_note(is_sell: bool, trend: Option<EmaTrend>) -> Option<&'static str> {
    match (is_sell, trend?) {
        (false, EmaTrend::Bullish) => Some(" | EMA confirms uptrend"),
        (false, EmaTrend::Bearish) => Some(" | EMA not confirming (fast below slow)"),
        (true, EmaTrend::Bearish) => Some(" | EMA confirms downtrend"),
        (true, EmaTrend::Bullish) => Some(" | EMA not confirming (fast above slow)"),
    }
}
