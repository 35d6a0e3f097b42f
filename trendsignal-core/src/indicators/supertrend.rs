//! Supertrend: ATR-scaled trailing band with a direction flag.
//!
//! Inherently sequential. At index i after the seed:
//! - final upper takes the basic upper when it is lower than the previous final
//!   upper or when the previous close broke above it; otherwise it is carried.
//! - final lower takes the basic lower when it is higher than the previous final
//!   lower or when the previous close broke below it; otherwise it is carried.
//! - direction turns up when close > previous supertrend, down when
//!   close < previous supertrend, and is carried on equality.
//! - supertrend is the final lower band while up, the final upper band while down.
//!
//! Seed: first bar with a valid ATR, direction up, supertrend = final lower.
//! Lookback: period.

use super::atr::Atr;
use super::Indicator;
use crate::domain::Bar;
use crate::signals::TrendDirection;

/// Full supertrend state, aligned with the input bars.
#[derive(Debug, Clone, PartialEq)]
pub struct SupertrendSeries {
    pub value: Vec<f64>,
    pub direction: Vec<Option<TrendDirection>>,
    pub final_upper: Vec<f64>,
    pub final_lower: Vec<f64>,
}

impl SupertrendSeries {
    fn empty(n: usize) -> Self {
        Self {
            value: vec![f64::NAN; n],
            direction: vec![None; n],
            final_upper: vec![f64::NAN; n],
            final_lower: vec![f64::NAN; n],
        }
    }

    /// Direction at the last bar, `None` before the seed.
    pub fn last_direction(&self) -> Option<TrendDirection> {
        self.direction.last().copied().flatten()
    }
}

#[derive(Debug, Clone)]
pub struct Supertrend {
    period: usize,
    multiplier: f64,
    name: String,
}

impl Supertrend {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Supertrend period must be >= 1");
        Self {
            period,
            multiplier,
            name: format!("supertrend_{period}_{multiplier}"),
        }
    }

    pub fn series(&self, bars: &[Bar]) -> SupertrendSeries {
        let n = bars.len();
        let mut out = SupertrendSeries::empty(n);

        let atr = Atr::new(self.period).compute(bars);
        let start = match atr.iter().position(|v| !v.is_nan()) {
            Some(idx) => idx,
            None => return out,
        };

        let basic = |i: usize| {
            let mid = bars[i].mid();
            let offset = self.multiplier * atr[i];
            (mid + offset, mid - offset)
        };

        let (upper, lower) = basic(start);
        out.final_upper[start] = upper;
        out.final_lower[start] = lower;
        out.value[start] = lower;
        out.direction[start] = Some(TrendDirection::Up);
        let mut direction = TrendDirection::Up;

        for i in (start + 1)..n {
            if atr[i].is_nan() {
                break;
            }
            let (basic_upper, basic_lower) = basic(i);
            let prev_close = bars[i - 1].close;
            let prev_upper = out.final_upper[i - 1];
            let prev_lower = out.final_lower[i - 1];

            out.final_upper[i] = if basic_upper < prev_upper || prev_close > prev_upper {
                basic_upper
            } else {
                prev_upper
            };
            out.final_lower[i] = if basic_lower > prev_lower || prev_close < prev_lower {
                basic_lower
            } else {
                prev_lower
            };

            let prev_value = out.value[i - 1];
            let close = bars[i].close;
            if close > prev_value {
                direction = TrendDirection::Up;
            } else if close < prev_value {
                direction = TrendDirection::Down;
            }

            out.direction[i] = Some(direction);
            out.value[i] = match direction {
                TrendDirection::Up => out.final_lower[i],
                TrendDirection::Down => out.final_upper[i],
            };
        }

        out
    }
}

impl Indicator for Supertrend {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        self.series(bars).value
    }
}
