//! Indicator implementations.
//!
//! Indicators are pure functions: bar history in, one value per bar out.
//! Warm-up bars carry `f64::NAN`; callers convert the value they read into
//! an `Option<f64>` with [`defined`] so that "not enough history" is explicit.

pub mod adx;
pub mod atr;
pub mod ema;
pub mod supertrend;
pub mod volatility;

pub use adx::{directional_index, Adx, DirectionalIndex};
pub use atr::{atr_percent, Atr};
pub use ema::{ema_of_series, Ema};
pub use supertrend::{Supertrend, SupertrendSeries};
pub use volatility::{returns, sample_std, tail};

use crate::domain::Bar;

/// Trait for single-series indicators.
///
/// `compute` returns a `Vec<f64>` of the same length as `bars`; the first
/// `lookback()` values are `f64::NAN`.
///
/// No value at bar t may depend on bars after t.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_13", "atr_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// `Some(v)` for a finite value, `None` for warm-up or missing values.
pub fn defined(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Last value of a series as an explicit option.
pub fn last_defined(series: &[f64]) -> Option<f64> {
    series.last().copied().and_then(defined)
}

/// Create synthetic hourly bars from close prices for testing.
///
/// open = prev_close (or close for first bar), high = max(open,close) + 1.0,
/// low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let open_ohlc: Vec<(f64, f64, f64, f64)> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            (open, open.max(close) + 1.0, open.min(close) - 1.0, close)
        })
        .collect();
    make_ohlc_bars(&open_ohlc)
}

/// Create hourly bars from `(open, high, low, close)` tuples for testing.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2026, 1, 5)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            timestamp: base + chrono::Duration::hours(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
