//! Technical indicator implementations.
//!
//! Every indicator produces a full series aligned with its input, `NaN`
//! until warmed up. Scoring only reads the final value of each series.

pub mod bollinger;
pub mod ema;
pub mod levels;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use bollinger::BollingerBands;
pub use ema::{ema, ewm};
pub use levels::{support_resistance, LEVEL_LOOKBACK};
pub use macd::Macd;
pub use rsi::Rsi;
pub use sma::{rolling_std, sma};
pub use stochastic::Stochastic;

use crate::types::{IndicatorSet, PriceSeries};

/// Final value of a series, `NaN` when empty.
pub fn last_value(series: &[f64]) -> f64 {
    series.last().copied().unwrap_or(f64::NAN)
}

impl IndicatorSet {
    /// Compute the full indicator set over a validated series.
    pub fn compute(series: &PriceSeries) -> Self {
        let closes = series.closes();
        let candles = series.candles();

        let macd = Macd::default().calculate(&closes);
        let bands = BollingerBands::default().calculate(&closes);
        let stoch = Stochastic::default().calculate(candles);
        let (support, resistance) = support_resistance(candles, LEVEL_LOOKBACK);

        Self {
            sma_20: last_value(&sma(&closes, 20)),
            sma_50: last_value(&sma(&closes, 50)),
            ema_12: last_value(&ema(&closes, 12)),
            ema_26: last_value(&ema(&closes, 26)),
            rsi_14: last_value(&Rsi::default().calculate(&closes)),
            macd_line: last_value(&macd.line),
            macd_signal: last_value(&macd.signal),
            macd_histogram: last_value(&macd.histogram),
            bollinger_upper: last_value(&bands.upper),
            bollinger_middle: last_value(&bands.middle),
            bollinger_lower: last_value(&bands.lower),
            stochastic_k: last_value(&stoch.k),
            stochastic_d: last_value(&stoch.d),
            support,
            resistance,
        }
    }
}
