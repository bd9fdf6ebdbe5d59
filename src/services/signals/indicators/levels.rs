//! Support and resistance.

use crate::types::OhlcPoint;

/// Candles considered when locating support and resistance.
pub const LEVEL_LOOKBACK: usize = 20;

/// Lowest low and highest high over the most recent `lookback` candles.
///
/// Uses every candle when fewer are available. Empty input yields `NaN` for both.
pub fn support_resistance(candles: &[OhlcPoint], lookback: usize) -> (f64, f64) {
    let start = candles.len().saturating_sub(lookback);
    let recent = &candles[start..];

    if recent.is_empty() {
        return (f64::NAN, f64::NAN);
    }

    let support = recent.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let resistance = recent
        .iter()
        .map(|c| c.high)
        .fold(f64::NEG_INFINITY, f64::max);

    (support, resistance)
}
