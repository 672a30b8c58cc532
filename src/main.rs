//! Atrium Lead Scoring & Attribution Engine
//!
//! Turns raw marketing-site form submissions into scored, attributed CRM
//! leads:
//! - submission validation and contact requirements
//! - behavioral scoring from the originating visitor session
//! - first/last-source attribution with a weighted touchpoint chain
//! - repeat-lead detection keyed by normalized email

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use api::middleware::rate_limit::RateLimitConfig;
use api::{router, AppState};
use lead_ingest::LeadPipeline;
use lead_postgres::{PostgresClient, PostgresConfig, PostgresStore};
use lead_store::{ActivityStore, LeadStore, MemoryStore, SessionStore, TouchpointStore};
use telemetry::{health, init_tracing_from_env, metrics};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    database: PostgresConfig,

    #[serde(default)]
    rate_limit: RateLimitConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: PostgresConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing_from_env();

    info!("Starting Atrium Lead Engine v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config()?;

    // Build the store stack: Postgres when configured, in-memory otherwise
    let (sessions, leads, touchpoints, activity) = build_stores(&config).await?;

    // Create the pipeline and application state
    let pipeline = Arc::new(LeadPipeline::new(sessions, leads, touchpoints, activity));
    let state = AppState::with_rate_limit(pipeline, config.rate_limit.clone());

    // Create router
    let app = router(state);

    // Start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!(final_metrics = ?metrics().snapshot(), "Shutdown complete");
    Ok(())
}

type StoreStack = (
    Arc<dyn SessionStore>,
    Arc<dyn LeadStore>,
    Arc<dyn TouchpointStore>,
    Arc<dyn ActivityStore>,
);

/// Connect the configured datastore and report its health.
///
/// An empty database URL selects the in-memory store, which keeps local
/// development and demos free of infrastructure.
async fn build_stores(config: &Config) -> Result<StoreStack> {
    if config.database.url.is_empty() {
        warn!("No database URL configured, running on the in-memory store");
        health().datastore.set_healthy();
        let store = Arc::new(MemoryStore::new());
        return Ok((store.clone(), store.clone(), store.clone(), store));
    }

    let client = PostgresClient::connect(config.database.clone())
        .await
        .context("Failed to connect to Postgres")?;

    // Idempotent DDL; an existing schema is fine
    if let Err(e) = lead_postgres::health::init_schema(&client).await {
        error!("Failed to initialize Postgres schema: {}", e);
    }

    if lead_postgres::health::check_connection(&client).await {
        health().datastore.set_healthy();
        info!("Postgres connection: healthy");
    } else {
        health().datastore.set_unhealthy("Connection failed");
        error!("Postgres connection: unhealthy");
    }

    let store = Arc::new(PostgresStore::new(client));
    Ok((store.clone(), store.clone(), store.clone(), store))
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("LEADS")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for nested config from environment
    // The config crate's nested parsing doesn't work reliably with underscored field names
    if let Ok(url) = std::env::var("LEADS_DATABASE_URL") {
        config.database.url = url;
    }
    if let Ok(max) = std::env::var("LEADS_DATABASE_MAX_CONNECTIONS") {
        if let Ok(max) = max.parse() {
            config.database.max_connections = max;
        }
    }
    if let Ok(max) = std::env::var("LEADS_RATE_LIMIT_MAX_PER_WINDOW") {
        if let Ok(max) = max.parse() {
            config.rate_limit.max_per_window = max;
        }
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
