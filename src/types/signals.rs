use serde::{Deserialize, Serialize, Serializer};

/// Recommended trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which front-end produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    TechnicalIndicators,
    ChartPattern,
    Error,
}

/// Signal strength, 0-100. Rendered as `"N%"` on the wire.
///
/// Derived from vote counts, not a calibrated probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Confidence(u8);

impl Confidence {
    /// Confidence of every error signal.
    pub const NONE: Confidence = Confidence(0);
    /// Confidence of a HOLD from indicator scoring.
    pub const HOLD: Confidence = Confidence(50);

    /// Clamp to 0-100.
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// `min(95, 60 + 8 * votes)` for the winning side of an indicator tally.
    pub fn from_votes(votes: usize) -> Self {
        let raw = 60usize.saturating_add(votes.saturating_mul(8));
        Self(raw.min(95) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Serialize for Confidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Latest value of every indicator the scoring rules read.
///
/// Values that had not finished warming up are `NaN` and serialize as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorSet {
    pub sma_20: f64,
    pub sma_50: f64,
    pub ema_12: f64,
    pub ema_26: f64,
    pub rsi_14: f64,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub bollinger_upper: f64,
    pub bollinger_middle: f64,
    pub bollinger_lower: f64,
    pub stochastic_k: f64,
    pub stochastic_d: f64,
    pub support: f64,
    pub resistance: f64,
}

/// Coarse trend flags extracted from a chart image.
///
/// `bullish` and `bearish` are never both set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PatternFlags {
    pub bullish: bool,
    pub bearish: bool,
    pub line_count: usize,
}

/// One scoring rule of the indicator path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Trend,
    Rsi,
    Macd,
    Bollinger,
    Stochastic,
    Proximity,
}

impl Rule {
    /// Every rule, in evaluation order.
    pub const ALL: [Rule; 6] = [
        Rule::Trend,
        Rule::Rsi,
        Rule::Macd,
        Rule::Bollinger,
        Rule::Stochastic,
        Rule::Proximity,
    ];

    /// Display weight. Reported alongside each vote but never summed into confidence.
    pub fn weight(&self) -> f64 {
        match self {
            Rule::Trend => 0.25,
            Rule::Rsi => 0.20,
            Rule::Macd => 0.15,
            Rule::Bollinger => 0.15,
            Rule::Stochastic => 0.10,
            Rule::Proximity => 0.15,
        }
    }
}

/// Direction a single rule voted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    Buy,
    Sell,
    Abstain,
}

/// A rule's vote as reported in the signal output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleVote {
    pub rule: Rule,
    pub vote: Vote,
    pub weight: f64,
}

/// Indicator values plus the votes they produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorReport {
    #[serde(flatten)]
    pub values: IndicatorSet,
    pub votes: Vec<RuleVote>,
}

/// Evidence a signal was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalDetails {
    Indicators(IndicatorReport),
    Patterns(PatternFlags),
}

/// Trading recommendation returned by the engine.
///
/// Both analysis paths and every failure produce this one shape. Failures
/// carry `analysis_type = error`, zero prices, `0%` confidence and a `message`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub action: Action,
    pub entry: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub confidence: Confidence,
    pub timeframe: String,
    #[serde(flatten)]
    pub details: Option<SignalDetails>,
    pub analysis_type: AnalysisType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Signal {
    /// Build the degenerate signal used for every failure.
    pub fn error(message: impl Into<String>, timeframe: &str) -> Self {
        Self {
            action: Action::Hold,
            entry: 0.0,
            take_profit: 0.0,
            stop_loss: 0.0,
            confidence: Confidence::NONE,
            timeframe: timeframe.to_string(),
            details: None,
            analysis_type: AnalysisType::Error,
            message: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.analysis_type == AnalysisType::Error
    }

    /// Indicator values, when this signal came from tabular analysis.
    pub fn indicators(&self) -> Option<&IndicatorReport> {
        match &self.details {
            Some(SignalDetails::Indicators(report)) => Some(report),
            _ => None,
        }
    }

    /// Pattern flags, when this signal came from image analysis.
    pub fn patterns(&self) -> Option<&PatternFlags> {
        match &self.details {
            Some(SignalDetails::Patterns(flags)) => Some(flags),
            _ => None,
        }
    }
}
