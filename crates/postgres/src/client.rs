//! Postgres client wrapper.

use crate::config::PostgresConfig;
use lead_core::{DbErrorCode, Error, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

/// Postgres connection pool wrapper.
#[derive(Clone)]
pub struct PostgresClient {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresClient {
    /// Connects a pool against the configured database.
    pub async fn connect(config: PostgresConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| {
                Error::database(
                    DbErrorCode::QueryFailed,
                    format!("Failed to connect to Postgres: {e}"),
                )
            })?;

        info!(
            max_connections = config.max_connections,
            "Connected Postgres pool"
        );

        Ok(Self { pool, config })
    }

    /// Returns the inner connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PostgresConfig {
        &self.config
    }
}
