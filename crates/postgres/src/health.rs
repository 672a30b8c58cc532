//! Postgres health checks.

use crate::client::PostgresClient;
use lead_core::{DbErrorCode, Error, Result};
use tracing::{debug, error};

/// Check database connection health.
pub async fn check_connection(client: &PostgresClient) -> bool {
    match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(client.pool())
        .await
    {
        Ok(_) => {
            debug!("Postgres connection healthy");
            true
        }
        Err(e) => {
            error!("Postgres health check failed: {}", e);
            false
        }
    }
}

/// Initialize database schema.
pub async fn init_schema(client: &PostgresClient) -> Result<()> {
    for ddl in crate::schema::all_tables() {
        sqlx::query(ddl).execute(client.pool()).await.map_err(|e| {
            Error::database(
                DbErrorCode::QueryFailed,
                format!("Failed to execute DDL: {e}"),
            )
        })?;
    }

    debug!("Postgres schema initialized");
    Ok(())
}
