//! Drawdown from the recent high and rally from the recent low.

use crate::domain::Bar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceMove {
    pub recent_high: f64,
    pub recent_low: f64,
    /// `(close - recent_high) / recent_high * 100`, zero or negative.
    pub drawdown_pct: f64,
    /// `(close - recent_low) / recent_low * 100`, zero or positive.
    pub rally_pct: f64,
}

/// Measure the move of the last close over the last `min(window, n)` bars.
///
/// `None` for an empty series.
pub fn measure(bars: &[Bar], window: usize) -> Option<PriceMove> {
    let close = bars.last()?.close;
    let start = bars.len().saturating_sub(window.max(1));
    let recent = &bars[start..];

    let recent_high = recent.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let recent_low = recent.iter().map(|b| b.low).fold(f64::MAX, f64::min);

    Some(PriceMove {
        recent_high,
        recent_low,
        drawdown_pct: (close - recent_high) / recent_high * 100.0,
        rally_pct: (close - recent_low) / recent_low * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn drawdown_and_rally_over_window() {
        let bars = make_ohlc_bars(&[
            (50.0, 200.0, 40.0, 50.0), // outside the window
            (100.0, 100.0, 80.0, 90.0),
            (90.0, 95.0, 70.0, 75.0),
            (75.0, 80.0, 72.0, 78.0),
        ]);
        let m = measure(&bars, 3).unwrap();
        assert_eq!(m.recent_high, 100.0);
        assert_eq!(m.recent_low, 70.0);
        assert_approx(m.drawdown_pct, -22.0, DEFAULT_EPSILON);
        assert_approx(m.rally_pct, 8.0 / 70.0 * 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn window_longer_than_series_uses_all_bars() {
        let bars = make_ohlc_bars(&[(50.0, 200.0, 40.0, 50.0), (60.0, 61.0, 59.0, 60.0)]);
        let m = measure(&bars, 140).unwrap();
        assert_eq!(m.recent_high, 200.0);
        assert_eq!(m.recent_low, 40.0);
        assert_approx(m.drawdown_pct, -70.0, DEFAULT_EPSILON);
    }

    #[test]
    fn empty_series_has_no_move() {
        assert_eq!(measure(&[], 10), None);
    }
}
