//! Bollinger Bands.

use super::sma::{rolling_std, sma};

/// Bollinger Bands indicator.
///
/// Consists of:
/// - Middle band: SMA(20)
/// - Upper band: SMA + 2 * StdDev
/// - Lower band: SMA - 2 * StdDev
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Self {
        Self {
            period,
            std_dev_multiplier,
        }
    }

    pub fn calculate(&self, closes: &[f64]) -> BandSeries {
        let middle = sma(closes, self.period);
        let std_dev = rolling_std(closes, self.period);

        let upper = middle
            .iter()
            .zip(&std_dev)
            .map(|(m, s)| m + self.std_dev_multiplier * s)
            .collect();
        let lower = middle
            .iter()
            .zip(&std_dev)
            .map(|(m, s)| m - self.std_dev_multiplier * s)
            .collect();

        BandSeries {
            upper,
            middle,
            lower,
        }
    }
}
