//! Datastore contracts the ingestion pipeline relies on.
//!
//! The engine produces and consumes plain data records; persistence is an
//! external collaborator specified only through these traits. Lookup
//! methods may fail without failing a submission (the pipeline degrades to
//! defaults); `insert_lead` failures are fatal to the operation.

use async_trait::async_trait;
use uuid::Uuid;

use lead_core::{LeadRecord, NewLead, Result, Session, SessionPatch, Touchpoint};

/// Session persistence.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Looks up a session by ID.
    async fn find_by_session_id(&self, id: Uuid) -> Result<Option<Session>>;

    /// Creates the session on first sight, otherwise merges the patch and
    /// increments the page-view counter. Returns the stored session.
    async fn upsert_session(&self, id: Uuid, patch: SessionPatch) -> Result<Session>;

    /// Marks a session converted. Idempotent; a missing session is a no-op.
    async fn mark_converted(&self, id: Uuid) -> Result<()>;
}

/// Lead persistence.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// All prior leads with this email, ordered by creation time ascending.
    async fn find_by_email(&self, email: &str) -> Result<Vec<LeadRecord>>;

    /// Inserts a lead, computing its repeat-lead fields atomically under a
    /// lock keyed by normalized email so concurrent same-email submissions
    /// cannot miss each other.
    async fn insert_lead(&self, lead: NewLead) -> Result<LeadRecord>;
}

/// Touchpoint persistence. Touchpoints are written once per lead and never
/// updated.
#[async_trait]
pub trait TouchpointStore: Send + Sync {
    /// Persists a touchpoint batch for a newly created lead.
    async fn insert_many(&self, touchpoints: Vec<Touchpoint>) -> Result<()>;
}

/// Read-only page-view/event history, used to build the behavioral
/// snapshot.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Page views recorded for a session.
    async fn page_view_count(&self, session_id: Uuid) -> Result<u64>;

    /// Non-pageview events recorded for a session.
    async fn event_count(&self, session_id: Uuid) -> Result<u64>;
}
