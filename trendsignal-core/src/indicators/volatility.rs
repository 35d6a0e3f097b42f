//! Close-to-close returns and their dispersion.

/// Fractional bar-over-bar returns: `close[t] / close[t-1] - 1`.
///
/// One element shorter than the input. A zero previous close yields NaN.
pub fn returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|w| {
            if w[0] == 0.0 {
                f64::NAN
            } else {
                w[1] / w[0] - 1.0
            }
        })
        .collect()
}

/// Sample standard deviation (n - 1 denominator) of the non-NaN values.
///
/// `None` when fewer than two values are available.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let n = valid.len();
    if n < 2 {
        return None;
    }
    let mean = valid.iter().sum::<f64>() / n as f64;
    let var = valid.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(var.sqrt())
}

/// The last `count` elements of a slice (all of it when shorter).
pub fn tail(values: &[f64], count: usize) -> &[f64] {
    &values[values.len().saturating_sub(count)..]
}
