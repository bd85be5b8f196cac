use gen_ai_on_aws::api::handlers::AppState;
use gen_ai_on_aws::api::routes::rate_limited_router;
use gen_ai_on_aws::config::Config;
use gen_ai_on_aws::obs::{init_tracing, log_format_from_env, DEFAULT_LOG_FILTER};
use std::net::SocketAddr;
use std::sync::Arc;

/// Main entry point for the API server.
///
/// Loads configuration once, builds the shared clients, and serves the
/// router behind a per-IP rate limiter.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(log_format_from_env()?, DEFAULT_LOG_FILTER);

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let addr = format!("0.0.0.0:{}", config.port);
    let app_state = Arc::new(AppState::from_config(config).await?);

    // Rate limiter: burst of 20 per IP, one request replenished every 10s.
    // The webhook route is exempt.
    let app = rate_limited_router(app_state, 10, 20)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
