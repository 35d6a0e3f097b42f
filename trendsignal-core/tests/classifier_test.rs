//! Integration tests for the trend signal classifier.
//!
//! Tests:
//! 1. Severe drawdown wins regardless of trend strength.
//! 2. Instrument class changes the verdict on the same bars.
//! 3. Look-ahead: indicator values on a truncated series match the full series.
//! 4. Invalid input is rejected with a typed error.
//! 5. Metrics snapshot is reported verbatim.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use trendsignal_core::config::{IndicatorConfig, STOCK_DAILY, WARRANT_DAILY, WARRANT_HOURLY};
use trendsignal_core::indicators::{directional_index, Supertrend};
use trendsignal_core::{
    classify, Bar, BarError, ClassifyError, Confidence, InstrumentClass, SignalAction, Timeframe,
};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 5)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

/// Bars from closes with a fixed 0.5% band around open/close.
fn bars_from_closes(closes: &[f64], step: Duration) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base_time() + step * i as i32,
                open,
                high: open.max(close) * 1.005,
                low: open.min(close) * 0.995,
                close,
                volume: 10_000,
            }
        })
        .collect()
}

/// Sideways chop around 100 followed by a steady decline of `decline_pct`
/// spread over `decline_bars`.
fn chop_then_decline(chop_bars: usize, decline_bars: usize, decline_pct: f64) -> Vec<f64> {
    let mut closes: Vec<f64> = (0..chop_bars)
        .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
        .collect();
    let last = *closes.last().unwrap();
    let per_bar = (1.0 - decline_pct / 100.0).powf(1.0 / decline_bars as f64);
    for i in 1..=decline_bars {
        closes.push(last * per_bar.powi(i as i32));
    }
    closes
}

fn static_thresholds(config: IndicatorConfig) -> IndicatorConfig {
    IndicatorConfig {
        use_dynamic_thresholds: false,
        ..config
    }
}

// ──────────────────────────────────────────────
// 1. Severe drawdown
// ──────────────────────────────────────────────

#[test]
fn severe_drawdown_is_strong_sell_high() {
    let closes = chop_then_decline(200, 20, 36.0);
    let bars = bars_from_closes(&closes, Duration::hours(1));
    let signal = classify(&bars, &static_thresholds(WARRANT_HOURLY)).unwrap();

    assert!(signal.metrics.drawdown_pct < -35.0);
    assert_eq!(signal.action, SignalAction::StrongSell);
    assert_eq!(signal.confidence, Confidence::High);
    assert!(signal.reason.starts_with("Severe drawdown"), "{}", signal.reason);
}

#[test]
fn volatility_spike_widens_thresholds() {
    // Quiet chop, then 20 bars swinging +/-6%.
    let mut closes: Vec<f64> = (0..200)
        .map(|i| if i % 2 == 0 { 100.0 } else { 100.2 })
        .collect();
    for i in 0..20 {
        let prev = *closes.last().unwrap();
        closes.push(prev * if i % 2 == 0 { 1.06 } else { 0.94 });
    }
    let bars = bars_from_closes(&closes, Duration::hours(1));
    let signal = classify(&bars, &WARRANT_HOURLY).unwrap();

    assert!(signal.metrics.volatility_adjusted);
    assert_eq!(signal.metrics.min_threshold, 25.0);
    assert_eq!(signal.metrics.severe_threshold, 37.5);

    let fixed = classify(&bars, &static_thresholds(WARRANT_HOURLY)).unwrap();
    assert!(!fixed.metrics.volatility_adjusted);
    assert_eq!(fixed.metrics.min_threshold, 20.0);
}

// ──────────────────────────────────────────────
// 2. Instrument class
// ──────────────────────────────────────────────

#[test]
fn stock_reacts_where_warrant_holds() {
    let closes = chop_then_decline(60, 10, 12.0);
    let bars = bars_from_closes(&closes, Duration::days(1));

    let stock = classify(&bars, &static_thresholds(STOCK_DAILY)).unwrap();
    let warrant = classify(&bars, &static_thresholds(WARRANT_DAILY)).unwrap();

    assert!(stock.action.is_sell(), "stock: {:?} {}", stock.action, stock.reason);
    assert_eq!(warrant.action, SignalAction::Hold);
    assert_eq!(warrant.confidence, Confidence::Low);
}

#[test]
fn resolved_profile_drives_classification() {
    let closes = chop_then_decline(60, 10, 12.0);
    let bars = bars_from_closes(&closes, Duration::days(1));
    let cfg = IndicatorConfig::resolve(Timeframe::Daily, InstrumentClass::Stock);
    assert_eq!(
        classify(&bars, &cfg).unwrap().metrics.recent_high,
        classify(&bars, &STOCK_DAILY).unwrap().metrics.recent_high
    );
}

// ──────────────────────────────────────────────
// 3. Look-ahead
// ──────────────────────────────────────────────

#[test]
fn truncated_series_match_full_series() {
    let closes: Vec<f64> = (0..120)
        .map(|i| 100.0 + (i as f64 * 0.2).sin() * 8.0 + i as f64 * 0.1)
        .collect();
    let bars = bars_from_closes(&closes, Duration::hours(1));
    let full_st = Supertrend::new(14, 3.5).series(&bars);
    let full_di = directional_index(&bars, 14);

    for cut in [30, 60, 90] {
        let st = Supertrend::new(14, 3.5).series(&bars[..cut]);
        let di = directional_index(&bars[..cut], 14);
        for i in 0..cut {
            assert_eq!(st.direction[i], full_st.direction[i], "direction at {i} (cut {cut})");
            assert!(
                st.value[i] == full_st.value[i] || (st.value[i].is_nan() && full_st.value[i].is_nan()),
                "supertrend at {i} (cut {cut})"
            );
            assert!(
                di.adx[i] == full_di.adx[i] || (di.adx[i].is_nan() && full_di.adx[i].is_nan()),
                "adx at {i} (cut {cut})"
            );
        }
    }
}

#[test]
fn classification_is_deterministic() {
    let closes = chop_then_decline(80, 30, 25.0);
    let bars = bars_from_closes(&closes, Duration::hours(1));
    assert_eq!(
        classify(&bars, &WARRANT_HOURLY).unwrap(),
        classify(&bars, &WARRANT_HOURLY).unwrap()
    );
}

// ──────────────────────────────────────────────
// 4. Invalid input
// ──────────────────────────────────────────────

#[test]
fn nan_bar_is_rejected() {
    let mut bars = bars_from_closes(&[100.0, 101.0, 102.0], Duration::hours(1));
    bars[1].close = f64::NAN;
    assert_eq!(
        classify(&bars, &WARRANT_HOURLY),
        Err(ClassifyError::Bars(BarError::NonFinite { index: 1 }))
    );
}

#[test]
fn duplicate_timestamp_is_rejected() {
    let mut bars = bars_from_closes(&[100.0, 101.0, 102.0], Duration::hours(1));
    bars[2].timestamp = bars[1].timestamp;
    assert!(matches!(
        classify(&bars, &WARRANT_HOURLY),
        Err(ClassifyError::Bars(BarError::NonIncreasingTimestamp { index: 2, .. }))
    ));
}

// ──────────────────────────────────────────────
// 5. Metrics
// ──────────────────────────────────────────────

#[test]
fn metrics_map_reports_warmed_up_indicators() {
    let closes = chop_then_decline(150, 20, 15.0);
    let bars = bars_from_closes(&closes, Duration::hours(1));
    let signal = classify(&bars, &WARRANT_HOURLY).unwrap();
    let map = signal.metrics.as_map();

    for key in [
        "current_price",
        "supertrend_direction",
        "supertrend_value",
        "adx",
        "plus_di",
        "minus_di",
        "atr_pct",
        "drawdown_pct",
        "rally_pct",
        "ema_fast",
        "ema_slow",
        "ema_trend",
    ] {
        assert!(map.contains_key(key), "missing {key}");
    }
    assert_eq!(map["current_price"], *closes.last().unwrap());
    assert_eq!(signal.evaluated_at, bars.last().unwrap().timestamp);
}
