//! Fixed-fractional position sizing.

use thiserror::Error;

use crate::services::signals::round_to;
use crate::types::{RiskAssessment, RiskRequest, SizeRecommendations};

/// Reward multiple assumed for every position.
pub const REWARD_RISK_RATIO: f64 = 2.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("Invalid input values: {0}")]
    InvalidInput(String),
}

/// Size a position so that hitting the stop loses `risk_pct` of the account.
pub fn position_size(request: &RiskRequest) -> Result<RiskAssessment, RiskError> {
    let RiskRequest {
        account_size,
        stop_loss,
        risk_pct,
    } = *request;

    if !account_size.is_finite() || account_size <= 0.0 {
        return Err(RiskError::InvalidInput(
            "account size must be positive".to_string(),
        ));
    }
    if !risk_pct.is_finite() || risk_pct <= 0.0 || risk_pct > 100.0 {
        return Err(RiskError::InvalidInput(
            "risk percentage must be in (0, 100]".to_string(),
        ));
    }
    if !stop_loss.is_finite() || stop_loss == 0.0 {
        return Err(RiskError::InvalidInput(
            "stop loss must be non-zero".to_string(),
        ));
    }

    let risk_amount = account_size * risk_pct / 100.0;
    let position = risk_amount / stop_loss.abs();

    Ok(RiskAssessment {
        account_size: round_to(account_size, 2),
        risk_percentage: risk_pct,
        risk_amount: round_to(risk_amount, 2),
        stop_loss,
        position_size: round_to(position, 4),
        max_loss: round_to(risk_amount, 2),
        potential_profit: round_to(risk_amount * REWARD_RISK_RATIO, 2),
        reward_risk_ratio: REWARD_RISK_RATIO,
        recommendations: SizeRecommendations {
            conservative: round_to(position * 0.5, 4),
            normal: round_to(position, 4),
            aggressive: round_to(position * 1.5, 4),
        },
    })
}
