//! Application state shared across handlers.

use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter, SharedRateLimiter};
use lead_ingest::LeadPipeline;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The ingestion pipeline
    pub pipeline: Arc<LeadPipeline>,
    /// Rate limiter
    pub rate_limiter: SharedRateLimiter,
}

impl AppState {
    pub fn new(pipeline: Arc<LeadPipeline>) -> Self {
        Self {
            pipeline,
            rate_limiter: Arc::new(RateLimiter::new(RateLimitConfig::default())),
        }
    }

    /// Create with custom rate limit config.
    pub fn with_rate_limit(pipeline: Arc<LeadPipeline>, rate_config: RateLimitConfig) -> Self {
        Self {
            pipeline,
            rate_limiter: Arc::new(RateLimiter::new(rate_config)),
        }
    }
}
