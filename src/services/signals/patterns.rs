//! Pattern-flag scoring for chart images.
//!
//! A chart image carries no usable quote, so entry prices come from a
//! [`PriceSource`]. The default source samples a placeholder range; callers
//! with real market data should supply their own implementation.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::round_to;
use crate::config::{PlaceholderPriceConfig, DEFAULT_PLACEHOLDER_PRICE_RANGE};
use crate::types::{Action, AnalysisType, Confidence, PatternFlags, Signal, SignalDetails};

/// Supplies the base price for image-derived signals.
pub trait PriceSource: Send + Sync {
    /// Price to enter at.
    fn base_price(&self) -> f64;
}

/// Uniform sample from `[min, max)`.
///
/// This is a stand-in: the prices it yields have no relation to any instrument.
pub struct UniformPriceSource {
    min: f64,
    max: f64,
    rng: Mutex<StdRng>,
}

impl UniformPriceSource {
    /// Sample `[min, max)` with an entropy-seeded RNG.
    pub fn new(min: f64, max: f64) -> Self {
        Self::with_rng(min, max, StdRng::from_entropy())
    }

    /// Sample `[min, max)` with a reproducible sequence.
    pub fn seeded(min: f64, max: f64, seed: u64) -> Self {
        Self::with_rng(min, max, StdRng::seed_from_u64(seed))
    }

    fn with_rng(min: f64, max: f64, rng: StdRng) -> Self {
        // gen_range panics on an empty range
        let (min, max) = if min.is_finite() && max.is_finite() && min < max {
            (min, max)
        } else {
            DEFAULT_PLACEHOLDER_PRICE_RANGE
        };
        Self {
            min,
            max,
            rng: Mutex::new(rng),
        }
    }

    pub fn from_config(config: &PlaceholderPriceConfig) -> Self {
        match config.seed {
            Some(seed) => Self::seeded(config.min, config.max, seed),
            None => Self::new(config.min, config.max),
        }
    }
}

impl Default for UniformPriceSource {
    fn default() -> Self {
        Self::from_config(&PlaceholderPriceConfig::default())
    }
}

impl PriceSource for UniformPriceSource {
    fn base_price(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(self.min..self.max)
    }
}

/// Always returns the same price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPriceSource(pub f64);

impl PriceSource for FixedPriceSource {
    fn base_price(&self) -> f64 {
        self.0
    }
}

/// Action and confidence implied by the pattern flags alone.
pub fn classify_patterns(flags: &PatternFlags) -> (Action, Confidence) {
    if flags.bullish {
        (Action::Buy, Confidence::new(75))
    } else if flags.bearish {
        (Action::Sell, Confidence::new(75))
    } else {
        (Action::Hold, Confidence::new(60))
    }
}

/// Turn pattern flags into a signal priced off `prices`.
///
/// Targets use fixed multipliers: BUY +2.5% / -1.5%, SELL -2.5% / +1.5%.
pub fn score_patterns(flags: &PatternFlags, prices: &dyn PriceSource, timeframe: &str) -> Signal {
    let (action, confidence) = classify_patterns(flags);
    let entry = prices.base_price();

    let (take_profit, stop_loss) = match action {
        Action::Buy => (entry * 1.025, entry * 0.985),
        Action::Sell => (entry * 0.975, entry * 1.015),
        Action::Hold => (entry, entry),
    };

    tracing::debug!(
        "Pattern signal {} at {} from {} lines",
        action,
        confidence,
        flags.line_count
    );

    Signal {
        action,
        entry: round_to(entry, 2),
        take_profit: round_to(take_profit, 2),
        stop_loss: round_to(stop_loss, 2),
        confidence,
        timeframe: timeframe.to_string(),
        details: Some(SignalDetails::Patterns(*flags)),
        analysis_type: AnalysisType::ChartPattern,
        message: None,
    }
}
