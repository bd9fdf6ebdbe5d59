//! Trading signal engine.
//!
//! Entry points never fail: any [`AnalysisError`] raised while validating,
//! computing or scoring is turned into an error signal carrying its message.

pub mod indicators;
pub mod patterns;
pub mod scoring;

pub use patterns::{
    classify_patterns, score_patterns, FixedPriceSource, PriceSource, UniformPriceSource,
};
pub use scoring::{cast_votes, score_indicators, PriceTargets, Tally, PROXIMITY_THRESHOLD};

use crate::error::AnalysisError;
use crate::services::preprocess::{build_series, extract_patterns, RawTable};
use crate::types::{IndicatorSet, PriceSeries, Signal};

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Score a validated series at its final close.
///
/// Zero or negative closes are still scored; only a non-finite close fails.
pub fn analyze_series(series: &PriceSeries, timeframe: &str) -> Result<Signal, AnalysisError> {
    let price = series.last_close();
    if !price.is_finite() {
        return Err(AnalysisError::Computation(format!(
            "last close {} is not a finite price",
            price
        )));
    }

    let set = IndicatorSet::compute(series);
    Ok(score_indicators(&set, price, timeframe))
}

/// Analyze a raw OHLCV table.
pub fn analyze_tabular(table: &RawTable, timeframe: &str) -> Signal {
    into_signal(
        build_series(table).and_then(|series| analyze_series(&series, timeframe)),
        timeframe,
    )
}

/// Analyze an uploaded CSV document.
pub fn analyze_csv(bytes: &[u8], timeframe: &str) -> Signal {
    let result = RawTable::from_csv(bytes)
        .and_then(|table| build_series(&table))
        .and_then(|series| analyze_series(&series, timeframe));
    into_signal(result, timeframe)
}

/// Analyze a chart image, pricing the signal off `prices`.
pub fn analyze_image(bytes: &[u8], timeframe: &str, prices: &dyn PriceSource) -> Signal {
    let result = extract_patterns(bytes).map(|flags| score_patterns(&flags, prices, timeframe));
    into_signal(result, timeframe)
}

fn into_signal(result: Result<Signal, AnalysisError>, timeframe: &str) -> Signal {
    match result {
        Ok(signal) => signal,
        Err(e) => {
            tracing::warn!("Analysis failed on {}: {}", timeframe, e);
            Signal::error(e.to_string(), timeframe)
        }
    }
}
