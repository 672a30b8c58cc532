//! Lead record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attribution::AcquisitionFields;

/// Behavioral engagement observed on the originating session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralSnapshot {
    /// Page views recorded for the session.
    pub pages_visited: u32,
    /// Total session duration in seconds.
    pub time_on_site_secs: u32,
    /// Non-pageview events recorded for the session.
    pub events_triggered: u32,
    /// Visits before this conversion. Fixed at 1; not recomputed from
    /// repeat-lead history.
    pub visits_before_conversion: u32,
}

impl Default for BehavioralSnapshot {
    fn default() -> Self {
        Self {
            pages_visited: 0,
            time_on_site_secs: 0,
            events_triggered: 0,
            visits_before_conversion: 1,
        }
    }
}

/// A lead as assembled by the ingestion pipeline, before repeat detection.
///
/// The ID is generated up front so touchpoints can reference the lead
/// before the insert completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    pub id: Uuid,
    pub session_id: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
    pub form_type: Option<String>,
    /// Opaque, size-capped form payload. Validated JSON, not interpreted.
    pub payload: serde_json::Value,
    #[serde(flatten)]
    pub acquisition: AcquisitionFields,
    pub lead_score: u8,
    #[serde(flatten)]
    pub behavior: BehavioralSnapshot,
    pub original_source: String,
    pub last_source: String,
    pub created_at: DateTime<Utc>,
}

/// Repeat-lead detection result for an email address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepeatInfo {
    pub is_repeat_lead: bool,
    pub original_lead_id: Option<Uuid>,
    pub previous_lead_count: u32,
}

impl RepeatInfo {
    /// No prior leads found (or no email to match on).
    pub fn none() -> Self {
        Self::default()
    }

    /// Derives repeat info from prior leads with the same email, ordered by
    /// creation time ascending. `original_lead_id` is the chronologically
    /// first.
    pub fn from_prior(prior: &[LeadRecord]) -> Self {
        match prior.first() {
            Some(first) => Self {
                is_repeat_lead: true,
                original_lead_id: Some(first.id),
                previous_lead_count: prior.len() as u32,
            },
            None => Self::none(),
        }
    }
}

/// A persisted lead, as returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub id: Uuid,
    pub session_id: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
    pub form_type: Option<String>,
    pub payload: serde_json::Value,
    #[serde(flatten)]
    pub acquisition: AcquisitionFields,
    pub lead_score: u8,
    #[serde(flatten)]
    pub behavior: BehavioralSnapshot,
    pub original_source: String,
    pub last_source: String,
    pub is_repeat_lead: bool,
    pub original_lead_id: Option<Uuid>,
    pub previous_lead_count: u32,
    pub created_at: DateTime<Utc>,
}

impl LeadRecord {
    /// Combines an assembled lead with its repeat-detection result.
    pub fn from_new(new: NewLead, repeat: RepeatInfo) -> Self {
        Self {
            id: new.id,
            session_id: new.session_id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            company: new.company,
            message: new.message,
            form_type: new.form_type,
            payload: new.payload,
            acquisition: new.acquisition,
            lead_score: new.lead_score,
            behavior: new.behavior,
            original_source: new.original_source,
            last_source: new.last_source,
            is_repeat_lead: repeat.is_repeat_lead,
            original_lead_id: repeat.original_lead_id,
            previous_lead_count: repeat.previous_lead_count,
            created_at: new.created_at,
        }
    }
}
