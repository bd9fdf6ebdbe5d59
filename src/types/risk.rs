use serde::{Deserialize, Serialize};

/// Inputs to the position-size calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskRequest {
    /// Account equity in quote currency.
    pub account_size: f64,
    /// Stop distance per unit; only its magnitude is used.
    pub stop_loss: f64,
    /// Percentage of the account to risk (0-100].
    pub risk_pct: f64,
}

/// Position sizes scaled around the normal recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeRecommendations {
    pub conservative: f64,
    pub normal: f64,
    pub aggressive: f64,
}

/// Position-size calculation result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub account_size: f64,
    pub risk_percentage: f64,
    pub risk_amount: f64,
    pub stop_loss: f64,
    pub position_size: f64,
    pub max_loss: f64,
    pub potential_profit: f64,
    pub reward_risk_ratio: f64,
    pub recommendations: SizeRecommendations,
}
