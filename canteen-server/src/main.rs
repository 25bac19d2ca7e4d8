//! canteen-server — Canteen ordering backend
//!
//! Long-running service that:
//! - Accepts orders and updates their lifecycle status (Postgres-backed)
//! - Pushes order events to connected WebSocket clients in real time
//! - Tracks live connections in an in-memory registry with lazy eviction

mod api;
mod config;
mod db;
mod error;
mod live;
mod state;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "canteen_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting canteen-server (env: {})", config.environment);

    // Initialize application state (connects to Postgres, runs migrations)
    let state = AppState::new(&config).await?;

    let app = api::create_router(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("canteen-server listening on {http_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
