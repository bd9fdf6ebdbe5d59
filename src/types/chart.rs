use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Minimum number of valid candles required before any indicator is computed.
pub const MIN_CANDLES: usize = 20;

/// Chart granularity accepted by the analyze endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
}

impl Timeframe {
    /// Every supported timeframe, shortest first.
    pub const ALL: [Timeframe; 7] = [
        Timeframe::OneMinute,
        Timeframe::FiveMinutes,
        Timeframe::FifteenMinutes,
        Timeframe::ThirtyMinutes,
        Timeframe::OneHour,
        Timeframe::FourHours,
        Timeframe::OneDay,
    ];

    /// Get the timeframe from its label. Labels are case-sensitive.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tf| tf.as_str() == s)
    }

    /// Wire label, e.g. `"15m"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1m",
            Timeframe::FiveMinutes => "5m",
            Timeframe::FifteenMinutes => "15m",
            Timeframe::ThirtyMinutes => "30m",
            Timeframe::OneHour => "1h",
            Timeframe::FourHours => "4h",
            Timeframe::OneDay => "1d",
        }
    }

    /// Comma-separated list of valid labels, for error messages.
    pub fn valid_labels() -> String {
        Self::ALL
            .iter()
            .map(|tf| tf.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OHLC (Open, High, Low, Close) data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcPoint {
    /// Raw time label as it appeared in the input, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl OhlcPoint {
    /// Candle with no time label or volume.
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time: None,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }
}

/// Chronologically ordered candles that passed validation.
///
/// Always holds at least [`MIN_CANDLES`] points; construction fails otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    candles: Vec<OhlcPoint>,
}

impl PriceSeries {
    /// Wrap validated candles, rejecting series shorter than [`MIN_CANDLES`].
    pub fn new(candles: Vec<OhlcPoint>) -> Result<Self, AnalysisError> {
        if candles.len() < MIN_CANDLES {
            return Err(AnalysisError::InsufficientData {
                rows: candles.len(),
                required: MIN_CANDLES,
            });
        }
        Ok(Self { candles })
    }

    pub fn candles(&self) -> &[OhlcPoint] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Never true for a constructed series; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Most recent close, the price every decision is made against.
    pub fn last_close(&self) -> f64 {
        self.candles.last().map_or(f64::NAN, |c| c.close)
    }
}
