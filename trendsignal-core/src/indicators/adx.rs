//! ADX: Average Directional Index (Wilder), with the +DI / -DI lines.
//!
//! Steps:
//! 1. Compute +DM and -DM from consecutive bars
//! 2. Smooth +DM, -DM, and TR using Wilder smoothing (alpha = 1/period)
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR)
//! 4. -DI = 100 * smoothed(-DM) / smoothed(TR)
//! 5. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 6. ADX = Wilder-smoothed DX
//!
//! DI lines are valid from index `period`, ADX from index `2 * period - 1`.

use super::atr::{true_range, wilder_smooth};
use super::Indicator;
use crate::domain::Bar;

/// The three directional series, aligned with the input bars.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalIndex {
    pub adx: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
}

/// Compute ADX, +DI and -DI over `period`.
pub fn directional_index(bars: &[Bar], period: usize) -> DirectionalIndex {
    let n = bars.len();
    let mut out = DirectionalIndex {
        adx: vec![f64::NAN; n],
        plus_di: vec![f64::NAN; n],
        minus_di: vec![f64::NAN; n],
    };

    if n < 2 || period == 0 {
        return out;
    }

    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];
    for i in 1..n {
        let up_move = bars[i].high - bars[i - 1].high;
        let down_move = bars[i - 1].low - bars[i].low;
        plus_dm[i] = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        minus_dm[i] = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };
    }

    // Align TR with the DM series: both start at index 1.
    let mut tr = true_range(bars);
    tr[0] = f64::NAN;

    let smooth_tr = wilder_smooth(&tr, period);
    let smooth_plus = wilder_smooth(&plus_dm, period);
    let smooth_minus = wilder_smooth(&minus_dm, period);

    let mut dx = vec![f64::NAN; n];
    for i in 0..n {
        if smooth_tr[i].is_nan() || smooth_tr[i] == 0.0 {
            continue;
        }
        let plus_di = 100.0 * smooth_plus[i] / smooth_tr[i];
        let minus_di = 100.0 * smooth_minus[i] / smooth_tr[i];
        out.plus_di[i] = plus_di;
        out.minus_di[i] = minus_di;

        let di_sum = plus_di + minus_di;
        dx[i] = if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / di_sum
        };
    }

    out.adx = wilder_smooth(&dx, period);
    out
}

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        directional_index(bars, self.period).adx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc_bars;

    fn trending(n: usize, step: f64) -> Vec<Bar> {
        let data: Vec<_> = (0..n)
            .map(|i| {
                let base = 100.0 + i as f64 * step;
                (base - 1.0, base + 3.0, base - 3.0, base + 2.0 * step.signum())
            })
            .collect();
        make_ohlc_bars(&data)
    }

    #[test]
    fn adx_bounds() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
            (101.0, 106.0, 100.0, 105.0),
            (105.0, 110.0, 103.0, 108.0),
            (108.0, 112.0, 106.0, 110.0),
            (110.0, 111.0, 104.0, 105.0),
            (105.0, 109.0, 103.0, 107.0),
            (107.0, 113.0, 105.0, 112.0),
        ]);
        let di = directional_index(&bars, 3);

        for (i, &v) in di.adx.iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "ADX out of bounds at bar {i}: {v}");
            }
        }
        for i in 0..bars.len() {
            if !di.plus_di[i].is_nan() {
                assert!(di.plus_di[i] >= 0.0 && di.minus_di[i] >= 0.0);
            }
        }
    }

    #[test]
    fn warmup_alignment() {
        let bars = trending(30, 5.0);
        let di = directional_index(&bars, 5);
        assert!(di.plus_di[4].is_nan());
        assert!(!di.plus_di[5].is_nan());
        assert!(di.adx[8].is_nan());
        assert!(!di.adx[9].is_nan());
    }

    #[test]
    fn uptrend_plus_di_dominates() {
        let bars = trending(30, 5.0);
        let di = directional_index(&bars, 5);
        let last = bars.len() - 1;
        assert!(di.plus_di[last] > di.minus_di[last]);
        assert!(di.adx[last] > 25.0, "ADX should be elevated, got {}", di.adx[last]);
    }

    #[test]
    fn downtrend_minus_di_dominates() {
        let bars = trending(30, -3.0);
        let di = directional_index(&bars, 5);
        let last = bars.len() - 1;
        assert!(di.minus_di[last] > di.plus_di[last]);
    }

    #[test]
    fn adx_lookback() {
        assert_eq!(Adx::new(14).lookback(), 27);
        assert_eq!(Adx::new(7).lookback(), 13);
    }

    #[test]
    fn adx_too_few_bars() {
        let bars = make_ohlc_bars(&[(100.0, 105.0, 95.0, 102.0)]);
        let result = Adx::new(3).compute(&bars);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
