pub mod analyze;
pub mod health;
pub mod risk;

use crate::AppState;
use axum::extract::DefaultBodyLimit;
use axum::Router;

/// Create the API router.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(analyze::router())
        .merge(risk::router())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
