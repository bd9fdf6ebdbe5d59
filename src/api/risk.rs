//! Position-size calculator endpoint.

use axum::{routing::post, Form, Json, Router};

use crate::error::{AppError, Result};
use crate::services::risk::{position_size, RiskError};
use crate::types::{RiskAssessment, RiskRequest};
use crate::AppState;

impl From<RiskError> for AppError {
    fn from(e: RiskError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/risk", post(calculate_risk))
}

/// Size a position from form fields `account_size`, `stop_loss` and `risk_pct`.
async fn calculate_risk(Form(request): Form<RiskRequest>) -> Result<Json<RiskAssessment>> {
    let assessment = position_size(&request)?;
    tracing::debug!(
        "Risk {}% of {} with stop {}: size {}",
        request.risk_pct,
        request.account_size,
        request.stop_loss,
        assessment.position_size
    );
    Ok(Json(assessment))
}
