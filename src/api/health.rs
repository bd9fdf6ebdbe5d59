//! Liveness endpoint.

use crate::AppState;
use axum::{routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Liveness report; `timestamp` serializes as RFC 3339 in UTC.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: DateTime<Utc>,
}

impl HealthResponse {
    fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            timestamp,
        }
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::at(Utc::now()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}
