//! Rate limiting.
//!
//! Fixed-window counters keyed by client IP. The counters live in a TTL
//! cache, so a key's window (and its memory) expires on its own and no
//! sweep task is needed.

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Maximum distinct keys tracked at once.
const MAX_TRACKED_KEYS: u64 = 100_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per window
    #[serde(default = "default_max_per_window")]
    pub max_per_window: u32,
    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_max_per_window() -> u32 {
    60
}

fn default_window_secs() -> u64 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_per_window: default_max_per_window(),
            window_secs: default_window_secs(),
        }
    }
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after: u64 },
}

/// Fixed-window rate limiter over a TTL cache.
pub struct RateLimiter {
    counters: Cache<String, Arc<AtomicU32>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            counters: Cache::builder()
                .max_capacity(MAX_TRACKED_KEYS)
                .time_to_live(Duration::from_secs(config.window_secs))
                .build(),
            config,
        }
    }

    /// Counts a request against the key's current window.
    pub async fn check(&self, key: &str) -> RateLimitDecision {
        let counter = self
            .counters
            .get_with(key.to_string(), async { Arc::new(AtomicU32::new(0)) })
            .await;

        let seen = counter.fetch_add(1, Ordering::Relaxed).saturating_add(1);

        if seen > self.config.max_per_window {
            RateLimitDecision::Limited {
                retry_after: self.config.window_secs,
            }
        } else {
            RateLimitDecision::Allowed
        }
    }
}

/// Shared rate limiter state.
pub type SharedRateLimiter = Arc<RateLimiter>;
