//! Simple Moving Average (SMA).

/// Rolling arithmetic mean over a trailing window.
///
/// Returns one value per input. The first `period - 1` values, and any value
/// whose window contains a `NaN`, are `NaN`.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |window| {
        window.iter().sum::<f64>() / window.len() as f64
    })
}

/// Rolling population standard deviation (divisor N).
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |window| {
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        let variance =
            window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / window.len() as f64;
        variance.sqrt()
    })
}

/// Apply `f` to every complete trailing window of `period` values.
pub(crate) fn rolling<F>(values: &[f64], period: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return f64::NAN;
            }
            let window = &values[i + 1 - period..=i];
            if window.iter().any(|v| v.is_nan()) {
                f64::NAN
            } else {
                f(window)
            }
        })
        .collect()
}
