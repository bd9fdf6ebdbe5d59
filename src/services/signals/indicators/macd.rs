//! MACD (Moving Average Convergence Divergence).

use super::ema::{ema, ewm};

/// MACD indicator.
///
/// Shows the relationship between two EMAs:
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = EMA(9) of MACD Line
/// - Histogram = MACD Line - Signal Line
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// Full MACD series, aligned with the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }

    /// Number of closes needed before the signal line is defined.
    pub fn min_periods(&self) -> usize {
        self.slow_period + self.signal_period - 1
    }

    pub fn calculate(&self, closes: &[f64]) -> MacdSeries {
        let fast = ema(closes, self.fast_period);
        let slow = ema(closes, self.slow_period);

        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();

        // Signal smooths only the defined part of the MACD line
        let signal = if self.signal_period == 0 {
            vec![f64::NAN; line.len()]
        } else {
            ewm(
                &line,
                2.0 / (self.signal_period as f64 + 1.0),
                self.signal_period,
            )
        };

        let histogram = line.iter().zip(&signal).map(|(m, s)| m - s).collect();

        MacdSeries {
            line,
            signal,
            histogram,
        }
    }
}
