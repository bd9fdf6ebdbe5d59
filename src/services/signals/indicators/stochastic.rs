//! Stochastic Oscillator.

use super::sma::sma;
use crate::types::OhlcPoint;

/// Stochastic Oscillator.
///
/// Compares closing price to price range over a period:
/// %K = (Current Close - Lowest Low) / (Highest High - Lowest Low) * 100
/// %D = SMA(%K, 3)
///
/// A window with no range leaves %K undefined.
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticSeries {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

impl Stochastic {
    pub fn new(k_period: usize, d_period: usize) -> Self {
        Self { k_period, d_period }
    }

    pub fn calculate(&self, candles: &[OhlcPoint]) -> StochasticSeries {
        let k: Vec<f64> = (0..candles.len())
            .map(|i| {
                if self.k_period == 0 || i + 1 < self.k_period {
                    return f64::NAN;
                }
                let window = &candles[i + 1 - self.k_period..=i];

                let lowest_low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
                let highest_high = window
                    .iter()
                    .map(|c| c.high)
                    .fold(f64::NEG_INFINITY, f64::max);
                let range = highest_high - lowest_low;

                if range > 0.0 {
                    (candles[i].close - lowest_low) / range * 100.0
                } else {
                    f64::NAN
                }
            })
            .collect();

        let d = sma(&k, self.d_period);

        StochasticSeries { k, d }
    }
}
