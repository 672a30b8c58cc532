//! Visitor session types.
//!
//! A session is created on a visitor's first page view and updated on every
//! subsequent page view or event: counters only increment, acquisition
//! fields are first-touch (an existing value is never overwritten), and the
//! conversion flag is idempotent. Sessions are never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::attribution::AcquisitionFields;

/// One visitor browsing episode.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique session ID
    pub id: Uuid,
    /// Optional user ID (max 128 chars)
    #[validate(length(max = 128))]
    pub user_id: Option<String>,
    /// Client IP
    #[validate(length(max = 45))]
    pub ip: Option<String>,
    /// Browser user agent
    #[validate(length(max = 512))]
    pub user_agent: Option<String>,
    /// First-touch acquisition fields
    #[serde(flatten)]
    pub acquisition: AcquisitionFields,
    /// First page of the visit
    #[validate(length(max = 2048))]
    pub landing_page: Option<String>,
    /// Referrer URL
    #[validate(length(max = 2048))]
    pub referrer: Option<String>,
    /// Page view count
    pub page_views: u32,
    /// Non-pageview event count
    pub events: u32,
    /// Whether a lead was created against this session
    pub converted: bool,
    /// Session start time
    pub started_at: DateTime<Utc>,
    /// Last activity time
    pub last_active_at: DateTime<Utc>,
}

/// Fields merged into a session on each page view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatch {
    pub user_id: Option<String>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    #[serde(flatten)]
    pub acquisition: AcquisitionFields,
    pub landing_page: Option<String>,
    pub referrer: Option<String>,
}

impl Session {
    /// Creates a session from its first page view.
    pub fn new(id: Uuid, patch: SessionPatch) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id: patch.user_id,
            ip: patch.ip,
            user_agent: patch.user_agent,
            acquisition: patch.acquisition,
            landing_page: patch.landing_page,
            referrer: patch.referrer,
            page_views: 1,
            events: 0,
            converted: false,
            started_at: now,
            last_active_at: now,
        }
    }

    /// Records a subsequent page view: increments the counter and merges
    /// fields. Existing values win (first-touch semantics).
    pub fn record_page_view(&mut self, patch: SessionPatch) {
        if self.user_id.is_none() {
            self.user_id = patch.user_id;
        }
        if self.ip.is_none() {
            self.ip = patch.ip;
        }
        if self.user_agent.is_none() {
            self.user_agent = patch.user_agent;
        }
        if self.landing_page.is_none() {
            self.landing_page = patch.landing_page;
        }
        if self.referrer.is_none() {
            self.referrer = patch.referrer;
        }
        self.acquisition = self.acquisition.merged_over(&patch.acquisition);

        self.page_views = self.page_views.saturating_add(1);
        self.last_active_at = Utc::now();
    }

    /// Records a non-pageview event.
    pub fn record_event(&mut self) {
        self.events = self.events.saturating_add(1);
        self.last_active_at = Utc::now();
    }

    /// Marks the session converted. Idempotent.
    pub fn mark_converted(&mut self) {
        self.converted = true;
    }

    /// Total session duration in seconds.
    pub fn duration_secs(&self) -> u32 {
        (self.last_active_at - self.started_at)
            .num_seconds()
            .clamp(0, u32::MAX as i64) as u32
    }
}
