use scalper::{app, AppState, Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scalper=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Starting Scalper server on {}:{} (upload limit {} bytes)",
        config.host, config.port, config.max_upload_bytes
    );
    if config.placeholder_price.seed.is_some() {
        info!("Chart-image prices use a fixed seed");
    }

    let addr = format!("{}:{}", config.host, config.port);
    let app = app(AppState::new(config));

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Scalper server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
