//! Exponential Moving Average (EMA).

/// Recursive exponentially weighted mean.
///
/// `y[0] = x[0]`, `y[t] = alpha * x[t] + (1 - alpha) * y[t-1]`. Outputs stay
/// `NaN` until `min_periods` observations have been seen. `NaN` inputs are
/// skipped: they neither update the state nor count as observations.
pub fn ewm(values: &[f64], alpha: f64, min_periods: usize) -> Vec<f64> {
    let mut state = f64::NAN;
    let mut seen = 0usize;

    values
        .iter()
        .map(|&value| {
            if !value.is_nan() {
                state = if seen == 0 {
                    value
                } else {
                    alpha * value + (1.0 - alpha) * state
                };
                seen += 1;
            }
            if seen >= min_periods.max(1) {
                state
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// EMA with span `period` (`alpha = 2 / (period + 1)`), seeded with the first value.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }
    ewm(values, 2.0 / (period as f64 + 1.0), period)
}
