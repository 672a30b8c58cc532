//! Common test setup functions.

use api::middleware::rate_limit::RateLimitConfig;
use api::{router, AppState};
use axum::Router;
use lead_core::{LeadRecord, Session, Touchpoint};
use lead_ingest::LeadPipeline;
use lead_store::MemoryStore;
use std::sync::Arc;
use uuid::Uuid;

/// Test context: the real router over an in-memory store.
///
/// Exercises every production code path except the Postgres transport; the
/// in-memory store implements the same contracts as the Postgres one,
/// failure injection included.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub router: Router,
}

impl TestContext {
    /// Create a test context with a permissive rate limit.
    pub fn new() -> Self {
        Self::with_rate_limit(RateLimitConfig {
            max_per_window: 10_000,
            window_secs: 60,
        })
    }

    /// Create a test context with a specific rate limit config.
    pub fn with_rate_limit(rate_config: RateLimitConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Arc::new(LeadPipeline::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        ));
        let state = AppState::with_rate_limit(pipeline, rate_config);

        // The datastore is always reachable in-process.
        telemetry::health().datastore.set_healthy();

        Self {
            store: store.clone(),
            router: router(state),
        }
    }

    pub fn seed_session(&self, session: Session) {
        self.store.seed_session(session);
    }

    pub fn session(&self, id: Uuid) -> Option<Session> {
        self.store.session(id)
    }

    pub fn leads(&self) -> Vec<LeadRecord> {
        self.store.leads()
    }

    pub fn touchpoints(&self) -> Vec<Touchpoint> {
        self.store.touchpoints()
    }

    /// Make datastore lookups fail (for degradation testing).
    pub fn set_lookup_failure(&self, should_fail: bool) {
        self.store.set_fail_lookups(should_fail);
    }

    /// Make datastore writes fail (for error testing).
    pub fn set_write_failure(&self, should_fail: bool) {
        self.store.set_fail_writes(should_fail);
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
