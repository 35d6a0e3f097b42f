//! Decision rule: first match wins.
//!
//! 1. Drawdown beyond the severe threshold → STRONG_SELL / HIGH.
//! 2. Drawdown beyond the minimum threshold with a confirmed downtrend
//!    (supertrend down, ADX above minimum, -DI > +DI) → SELL, escalated to
//!    STRONG_SELL when ADX > 40 and the DI gap exceeds 15.
//! 3. Rally beyond the minimum threshold with a confirmed uptrend → BUY.
//! 4. Otherwise HOLD / LOW.
//!
//! Undefined ADX or DI values never satisfy a trend condition; they are
//! handled exactly like an ADX below the minimum.

use super::thresholds::MoveThresholds;
use crate::signals::{Confidence, SignalAction, TrendDirection};

pub const VERY_STRONG_ADX: f64 = 40.0;
pub const VERY_STRONG_DI_GAP: f64 = 15.0;
pub const HIGH_CONFIDENCE_ADX: f64 = 35.0;

/// Indicator readings at the last bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub direction: Option<TrendDirection>,
    pub adx: Option<f64>,
    pub plus_di: Option<f64>,
    pub minus_di: Option<f64>,
    pub drawdown_pct: f64,
    pub rally_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: SignalAction,
    pub confidence: Confidence,
    pub reason: String,
}

/// A trend reading with every component defined and ADX above the minimum.
struct ConfirmedTrend {
    adx: f64,
    plus_di: f64,
    minus_di: f64,
}

impl Observation {
    fn confirmed_trend(&self, min_adx: f64) -> Option<ConfirmedTrend> {
        let adx = self.adx?;
        if adx <= min_adx {
            return None;
        }
        Some(ConfirmedTrend {
            adx,
            plus_di: self.plus_di?,
            minus_di: self.minus_di?,
        })
    }
}

fn tiered_confidence(adx: f64) -> Confidence {
    if adx > HIGH_CONFIDENCE_ADX {
        Confidence::High
    } else {
        Confidence::Medium
    }
}

pub fn decide(obs: &Observation, thresholds: &MoveThresholds, min_adx: f64) -> Decision {
    if obs.drawdown_pct < -thresholds.severe_move {
        return Decision {
            action: SignalAction::StrongSell,
            confidence: Confidence::High,
            reason: format!(
                "Severe drawdown of {:.1}% exceeds the -{:.1}% threshold",
                obs.drawdown_pct, thresholds.severe_move
            ),
        };
    }

    let trend = obs.confirmed_trend(min_adx);

    if obs.drawdown_pct < -thresholds.min_move && obs.direction == Some(TrendDirection::Down) {
        if let Some(t) = trend.as_ref().filter(|t| t.minus_di > t.plus_di) {
            let gap = t.minus_di - t.plus_di;
            // Nested inside the SELL branch: a very strong downtrend escalates.
            if t.adx > VERY_STRONG_ADX && gap > VERY_STRONG_DI_GAP {
                return Decision {
                    action: SignalAction::StrongSell,
                    confidence: Confidence::High,
                    reason: format!(
                        "Strong downtrend: {:.1}% drawdown, supertrend down, ADX {:.1}, -DI leads +DI by {:.1}",
                        obs.drawdown_pct, t.adx, gap
                    ),
                };
            }
            return Decision {
                action: SignalAction::Sell,
                confidence: tiered_confidence(t.adx),
                reason: format!(
                    "Downtrend: {:.1}% drawdown, supertrend down, ADX {:.1}, -DI {:.1} > +DI {:.1}",
                    obs.drawdown_pct, t.adx, t.minus_di, t.plus_di
                ),
            };
        }
    }

    if obs.rally_pct > thresholds.min_move && obs.direction == Some(TrendDirection::Up) {
        if let Some(t) = trend.as_ref().filter(|t| t.plus_di > t.minus_di) {
            return Decision {
                action: SignalAction::Buy,
                confidence: tiered_confidence(t.adx),
                reason: format!(
                    "Uptrend: {:.1}% rally from recent low, supertrend up, ADX {:.1}, +DI {:.1} > -DI {:.1}",
                    obs.rally_pct, t.adx, t.plus_di, t.minus_di
                ),
            };
        }
    }

    Decision {
        action: SignalAction::Hold,
        confidence: Confidence::Low,
        reason: hold_reason(obs, thresholds, trend.is_some(), min_adx),
    }
}

fn hold_reason(
    obs: &Observation,
    thresholds: &MoveThresholds,
    trending: bool,
    min_adx: f64,
) -> String {
    if !trending {
        return match obs.adx {
            Some(adx) if obs.plus_di.is_some() && obs.minus_di.is_some() => format!(
                "Ranging market: ADX {adx:.1} does not exceed {min_adx:.1}"
            ),
            _ => "Ranging market: trend strength undefined (insufficient history)".to_string(),
        };
    }

    let within = obs.drawdown_pct >= -thresholds.min_move && obs.rally_pct <= thresholds.min_move;
    if within {
        return format!(
            "No significant move: drawdown {:.1}% and rally {:.1}% within ±{:.1}%",
            obs.drawdown_pct, obs.rally_pct, thresholds.min_move
        );
    }

    let direction = match obs.direction {
        Some(TrendDirection::Up) => "up",
        Some(TrendDirection::Down) => "down",
        None => "undefined",
    };
    format!(
        "Mixed signals: drawdown {:.1}%, rally {:.1}%, supertrend {direction}",
        obs.drawdown_pct, obs.rally_pct
    )
}
