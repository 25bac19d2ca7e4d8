//! Application state for the canteen backend

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Config;
use crate::live::{ConnectionRegistry, Notifier};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Live WebSocket connection registry
    pub registry: Arc<ConnectionRegistry>,
    /// Event delivery over the registry
    pub notifier: Notifier,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let registry = Arc::new(ConnectionRegistry::new(config.ws_channel_capacity));
        let notifier = Notifier::new(registry.clone());

        Ok(Self {
            pool,
            registry,
            notifier,
        })
    }
}
