//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! ATR uses Wilder smoothing (alpha = 1/period), seeded with the mean of the
//! first `period` true ranges that have a previous close.
//! Lookback: period (first valid value at index `period`).

use super::{defined, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

/// Compute the True Range series from bars.
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let range = bar.high - bar.low;
            if i == 0 {
                return range;
            }
            let pc = bars[i - 1].close;
            range.max((bar.high - pc).abs()).max((bar.low - pc).abs())
        })
        .collect()
}

/// Apply Wilder smoothing to a series. Alpha = 1/period.
///
/// The seed is the mean of the first window of `period` consecutive non-NaN
/// values and lands on the last index of that window. A NaN after the seed
/// invalidates the remainder of the series.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    let seed_start = match (0..=n - period)
        .find(|&i| values[i..i + period].iter().all(|v| !v.is_nan()))
    {
        Some(s) => s,
        None => return result,
    };
    let seed_end = seed_start + period;

    let mut prev = values[seed_start..seed_end].iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = prev;

    let alpha = 1.0 / period as f64;
    for i in seed_end..n {
        if values[i].is_nan() {
            break;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }

    result
}

/// ATR of the last bar as a percentage of its close.
pub fn atr_percent(bars: &[Bar], period: usize) -> Option<f64> {
    let last = bars.last()?;
    let atr = defined(*Atr::new(period).compute(bars).last()?)?;
    if last.close == 0.0 {
        return None;
    }
    Some(atr / last.close * 100.0)
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut tr = true_range(bars);
        // TR[0] has no previous close; the seed window starts at TR[1].
        if let Some(first) = tr.first_mut() {
            *first = f64::NAN;
        }
        wilder_smooth(&tr, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn true_range_basic() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),  // TR = 105-95 = 10
            (102.0, 108.0, 100.0, 106.0), // TR = max(8, |108-102|, |100-102|) = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = max(9, |107-106|, |98-106|) = 9
        ]);
        let tr = true_range(&bars);
        assert_approx(tr[0], 10.0, DEFAULT_EPSILON);
        assert_approx(tr[1], 8.0, DEFAULT_EPSILON);
        assert_approx(tr[2], 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let bars = make_ohlc_bars(&[
            (98.0, 102.0, 97.0, 100.0),
            (110.0, 115.0, 108.0, 112.0), // TR = max(7, |115-100|, |108-100|) = 15
        ]);
        let tr = true_range(&bars);
        assert_approx(tr[1], 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_period_3() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),  // TR = 10 (ignored, no prev close)
            (102.0, 108.0, 100.0, 106.0), // TR = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = 9
            (99.0, 103.0, 97.0, 101.0),   // TR = 6
            (101.0, 106.0, 100.0, 105.0), // TR = 6
        ]);
        let result = Atr::new(3).compute(&bars);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        // Seed: mean(8, 9, 6) = 23/3; next = (1/3)*6 + (2/3)*(23/3) = 64/9
        assert_approx(result[3], 23.0 / 3.0, DEFAULT_EPSILON);
        assert_approx(result[4], 64.0 / 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_first_period_bars_have_no_value() {
        let bars = crate::indicators::make_bars(&[10.0; 20]);
        let result = Atr::new(14).compute(&bars);
        assert!(result[..14].iter().all(|v| v.is_nan()));
        assert!(!result[14].is_nan());
    }

    #[test]
    fn wilder_smooth_skips_leading_nan() {
        let values = [f64::NAN, f64::NAN, 2.0, 4.0, 6.0];
        let result = wilder_smooth(&values, 2);
        assert!(result[2].is_nan());
        assert_approx(result[3], 3.0, DEFAULT_EPSILON);
        assert_approx(result[4], 4.5, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_smooth_too_short() {
        assert!(wilder_smooth(&[1.0, 2.0], 3).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn atr_percent_of_close() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
        ]);
        let pct = atr_percent(&bars, 3).unwrap();
        assert_approx(pct, (23.0 / 3.0) / 101.0 * 100.0, DEFAULT_EPSILON);
        assert_eq!(atr_percent(&bars, 10), None);
    }

    #[test]
    fn atr_lookback() {
        assert_eq!(Atr::new(14).lookback(), 14);
    }
}
