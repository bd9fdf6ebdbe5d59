//! Scalper - trading signal engine for OHLCV price history and chart images

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod types;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::{AnalysisError, AppError};
pub use services::signals::{
    analyze_csv, analyze_image, analyze_series, analyze_tabular, FixedPriceSource, PriceSource,
    UniformPriceSource,
};
pub use types::*;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub prices: Arc<dyn PriceSource>,
}

impl AppState {
    /// State with the placeholder price source described by `config`.
    pub fn new(config: Config) -> Self {
        let prices = Arc::new(UniformPriceSource::from_config(&config.placeholder_price));
        Self::with_prices(config, prices)
    }

    pub fn with_prices(config: Config, prices: Arc<dyn PriceSource>) -> Self {
        Self {
            config: Arc::new(config),
            prices,
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(AllowOrigin::list(allowed))
    }
}

/// Build the full application with middleware and state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(api::router(state.config.max_upload_bytes))
        .layer(cors_layer(&state.config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
