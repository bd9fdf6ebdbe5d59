//! Indicator vote scoring.
//!
//! Six rules each cast at most one vote. The side with more votes wins and
//! confidence is a function of the winning vote count only. Rule weights are
//! carried into the output for display but never summed.

use super::round_to;
use crate::types::{
    Action, AnalysisType, Confidence, IndicatorReport, IndicatorSet, Rule, RuleVote, Signal,
    SignalDetails, Vote,
};

/// Relative distance to support/resistance that counts as "near".
pub const PROXIMITY_THRESHOLD: f64 = 0.01;

/// Vote counts per direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub buy: usize,
    pub sell: usize,
}

impl Tally {
    pub fn from_votes(votes: &[RuleVote]) -> Self {
        votes.iter().fold(Self::default(), |mut tally, v| {
            match v.vote {
                Vote::Buy => tally.buy += 1,
                Vote::Sell => tally.sell += 1,
                Vote::Abstain => {}
            }
            tally
        })
    }

    /// Winning action and its confidence.
    pub fn decide(&self) -> (Action, Confidence) {
        if self.buy > self.sell {
            (Action::Buy, Confidence::from_votes(self.buy))
        } else if self.sell > self.buy {
            (Action::Sell, Confidence::from_votes(self.sell))
        } else {
            (Action::Hold, Confidence::HOLD)
        }
    }
}

/// Entry, take-profit and stop-loss for a decided action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceTargets {
    pub entry: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
}

impl PriceTargets {
    /// Targets bounded by the recent support/resistance levels.
    ///
    /// BUY takes profit at the nearer of resistance and +2%, stops at the
    /// nearer of support and -1.5%. SELL mirrors this. HOLD pins both to entry.
    pub fn from_levels(action: Action, entry: f64, support: f64, resistance: f64) -> Self {
        let (take_profit, stop_loss) = match action {
            Action::Buy => (resistance.min(entry * 1.02), support.max(entry * 0.985)),
            Action::Sell => (support.max(entry * 0.98), resistance.min(entry * 1.015)),
            Action::Hold => (entry, entry),
        };
        Self {
            entry,
            take_profit,
            stop_loss,
        }
    }

    /// Round every level to cents.
    pub fn rounded(self) -> Self {
        Self {
            entry: round_to(self.entry, 2),
            take_profit: round_to(self.take_profit, 2),
            stop_loss: round_to(self.stop_loss, 2),
        }
    }
}

/// True when every input finished warming up.
///
/// Rules with any undefined input abstain rather than fail.
fn warmed_up(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

impl Rule {
    /// Evaluate this rule against the latest indicator values.
    pub fn evaluate(&self, set: &IndicatorSet, price: f64) -> Vote {
        match self {
            Rule::Trend => {
                if !warmed_up(&[set.sma_20, set.sma_50, set.ema_12, set.ema_26]) {
                    return Vote::Abstain;
                }
                if set.sma_20 > set.sma_50 && set.ema_12 > set.ema_26 {
                    Vote::Buy
                } else if set.sma_20 < set.sma_50 && set.ema_12 < set.ema_26 {
                    Vote::Sell
                } else {
                    Vote::Abstain
                }
            }
            Rule::Rsi => {
                if !warmed_up(&[set.rsi_14]) {
                    return Vote::Abstain;
                }
                if set.rsi_14 < 30.0 {
                    Vote::Buy
                } else if set.rsi_14 > 70.0 {
                    Vote::Sell
                } else {
                    Vote::Abstain
                }
            }
            Rule::Macd => {
                if !warmed_up(&[set.macd_line, set.macd_signal]) {
                    return Vote::Abstain;
                }
                let (macd, signal) = (set.macd_line, set.macd_signal);
                if macd > signal && macd > 0.0 {
                    Vote::Buy
                } else if macd < signal && macd < 0.0 {
                    Vote::Sell
                } else {
                    Vote::Abstain
                }
            }
            Rule::Bollinger => {
                if !warmed_up(&[price, set.bollinger_lower, set.bollinger_upper]) {
                    return Vote::Abstain;
                }
                if price < set.bollinger_lower {
                    Vote::Buy
                } else if price > set.bollinger_upper {
                    Vote::Sell
                } else {
                    Vote::Abstain
                }
            }
            Rule::Stochastic => {
                if !warmed_up(&[set.stochastic_k, set.stochastic_d]) {
                    return Vote::Abstain;
                }
                let (k, d) = (set.stochastic_k, set.stochastic_d);
                if k < 20.0 && d < 20.0 {
                    Vote::Buy
                } else if k > 80.0 && d > 80.0 {
                    Vote::Sell
                } else {
                    Vote::Abstain
                }
            }
            Rule::Proximity => {
                if !warmed_up(&[price]) || price <= 0.0 {
                    return Vote::Abstain;
                }
                // Each level is checked on its own; an undefined one only silences its side
                let near = |level: f64| {
                    warmed_up(&[level]) && (price - level).abs() / price < PROXIMITY_THRESHOLD
                };
                if near(set.support) {
                    Vote::Buy
                } else if near(set.resistance) {
                    Vote::Sell
                } else {
                    Vote::Abstain
                }
            }
        }
    }
}

/// Run every rule and record its vote.
pub fn cast_votes(set: &IndicatorSet, price: f64) -> Vec<RuleVote> {
    Rule::ALL
        .iter()
        .map(|rule| RuleVote {
            rule: *rule,
            vote: rule.evaluate(set, price),
            weight: rule.weight(),
        })
        .collect()
}

/// Indicator values rounded for display: MACD to 4 places, the rest to 2.
fn display_values(set: &IndicatorSet) -> IndicatorSet {
    IndicatorSet {
        sma_20: round_to(set.sma_20, 2),
        sma_50: round_to(set.sma_50, 2),
        ema_12: round_to(set.ema_12, 2),
        ema_26: round_to(set.ema_26, 2),
        rsi_14: round_to(set.rsi_14, 2),
        macd_line: round_to(set.macd_line, 4),
        macd_signal: round_to(set.macd_signal, 4),
        macd_histogram: round_to(set.macd_histogram, 4),
        bollinger_upper: round_to(set.bollinger_upper, 2),
        bollinger_middle: round_to(set.bollinger_middle, 2),
        bollinger_lower: round_to(set.bollinger_lower, 2),
        stochastic_k: round_to(set.stochastic_k, 2),
        stochastic_d: round_to(set.stochastic_d, 2),
        support: round_to(set.support, 2),
        resistance: round_to(set.resistance, 2),
    }
}

/// Turn indicator values and the current price into a signal.
pub fn score_indicators(set: &IndicatorSet, price: f64, timeframe: &str) -> Signal {
    let votes = cast_votes(set, price);
    let tally = Tally::from_votes(&votes);
    let (action, confidence) = tally.decide();
    let targets = PriceTargets::from_levels(action, price, set.support, set.resistance).rounded();

    tracing::debug!(
        "Scored {} at {} ({} buy / {} sell votes)",
        action,
        confidence,
        tally.buy,
        tally.sell
    );

    Signal {
        action,
        entry: targets.entry,
        take_profit: targets.take_profit,
        stop_loss: targets.stop_loss,
        confidence,
        timeframe: timeframe.to_string(),
        details: Some(SignalDetails::Indicators(IndicatorReport {
            values: display_values(set),
            votes,
        })),
        analysis_type: AnalysisType::TechnicalIndicators,
        message: None,
    }
}
