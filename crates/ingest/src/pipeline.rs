//! The lead ingestion pipeline.
//!
//! Orchestrates a form submission end to end: validate, look up the
//! originating session, snapshot behavioral engagement, resolve attribution,
//! score, persist. Lookup failures degrade to defaults so a datastore blip
//! never loses a lead; only the lead insert itself is fatal.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use lead_core::{
    resolve_attribution, score_lead, BehavioralSnapshot, LeadRecord, LeadSubmission, NewLead,
    Result, Session,
};
use lead_store::{ActivityStore, LeadStore, SessionStore, TouchpointStore};
use telemetry::metrics;

/// Orchestrates lead ingestion over the store contracts.
#[derive(Clone)]
pub struct LeadPipeline {
    sessions: Arc<dyn SessionStore>,
    leads: Arc<dyn LeadStore>,
    touchpoints: Arc<dyn TouchpointStore>,
    activity: Arc<dyn ActivityStore>,
}

impl LeadPipeline {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        leads: Arc<dyn LeadStore>,
        touchpoints: Arc<dyn TouchpointStore>,
        activity: Arc<dyn ActivityStore>,
    ) -> Self {
        Self {
            sessions,
            leads,
            touchpoints,
            activity,
        }
    }

    /// Runs a submission through the full pipeline.
    ///
    /// Returns the persisted record, repeat-lead fields included. Validation
    /// errors and lead-insert failures surface to the caller; everything
    /// else degrades.
    pub async fn ingest(&self, submission: LeadSubmission) -> Result<LeadRecord> {
        let started = Instant::now();

        submission.validate_submission()?;

        let session = self.lookup_session(&submission).await;

        let behavior = match &session {
            Some(session) => self.snapshot_behavior(session).await,
            None => BehavioralSnapshot::default(),
        };

        // Submission fields win over whatever the session accumulated.
        let session_acquisition = session
            .as_ref()
            .map(|s| s.acquisition.clone())
            .unwrap_or_default();
        let acquisition = submission.acquisition.merged_over(&session_acquisition);

        let lead_score = score_lead(&submission, &behavior, &acquisition);

        let lead_id = Uuid::new_v4();
        let session_id = session.as_ref().map(|s| s.id);
        let observed_at = session.as_ref().map(|s| s.started_at).unwrap_or_else(Utc::now);

        let attribution = resolve_attribution(
            &acquisition.to_source_touches(observed_at),
            lead_id,
            session_id,
        );

        let new_lead = NewLead {
            id: lead_id,
            session_id,
            name: submission.name,
            email: submission.email,
            phone: submission.phone,
            company: submission.company,
            message: submission.message,
            form_type: submission.form_type,
            payload: submission.payload,
            acquisition,
            lead_score,
            behavior,
            original_source: attribution.original_source.clone(),
            last_source: attribution.last_source.clone(),
            created_at: Utc::now(),
        };

        let insert_started = Instant::now();
        let record = self.leads.insert_lead(new_lead).await?;
        metrics()
            .lead_insert_latency_ms
            .observe(insert_started.elapsed().as_millis() as u64);

        metrics().leads_created.inc();
        if record.is_repeat_lead {
            metrics().repeat_leads_detected.inc();
        }

        // Post-insert bookkeeping. Neither failure can undo the lead.
        let mark = async {
            if let Some(sid) = record.session_id {
                if let Err(e) = self.sessions.mark_converted(sid).await {
                    metrics().conversion_mark_failures.inc();
                    warn!(session_id = %sid, error = %e, "Failed to mark session converted");
                }
            }
        };
        let persist_touches = async {
            if attribution.touchpoints.is_empty() {
                return;
            }
            let count = attribution.touchpoints.len() as u64;
            match self.touchpoints.insert_many(attribution.touchpoints.clone()).await {
                Ok(()) => metrics().touchpoints_recorded.inc_by(count),
                Err(e) => {
                    metrics().touchpoint_write_failures.inc();
                    warn!(lead_id = %record.id, error = %e, "Failed to persist touchpoints");
                }
            }
        };
        tokio::join!(mark, persist_touches);

        metrics()
            .ingest_latency_ms
            .observe(started.elapsed().as_millis() as u64);

        info!(
            lead_id = %record.id,
            lead_score = record.lead_score,
            original_source = %record.original_source,
            is_repeat_lead = record.is_repeat_lead,
            "Lead ingested"
        );

        Ok(record)
    }

    /// Looks up the originating session, if any. Lookup failures degrade to
    /// "no session" rather than failing the submission.
    async fn lookup_session(&self, submission: &LeadSubmission) -> Option<Session> {
        let session_id = submission.session_id?;

        match self.sessions.find_by_session_id(session_id).await {
            Ok(session) => session,
            Err(e) => {
                metrics().session_lookup_failures.inc();
                warn!(
                    session_id = %session_id,
                    error = %e,
                    "Session lookup failed, proceeding without session context"
                );
                None
            }
        }
    }

    /// Snapshots behavioral engagement for the session. Activity-count
    /// failures fall back to the session's own counters.
    async fn snapshot_behavior(&self, session: &Session) -> BehavioralSnapshot {
        let (pages, events) = tokio::join!(
            self.activity.page_view_count(session.id),
            self.activity.event_count(session.id),
        );

        let pages_visited = match pages {
            Ok(n) => n.min(u32::MAX as u64) as u32,
            Err(e) => {
                metrics().activity_lookup_failures.inc();
                warn!(session_id = %session.id, error = %e, "Page-view count lookup failed");
                session.page_views
            }
        };
        let events_triggered = match events {
            Ok(n) => n.min(u32::MAX as u64) as u32,
            Err(e) => {
                metrics().activity_lookup_failures.inc();
                warn!(session_id = %session.id, error = %e, "Event count lookup failed");
                session.events
            }
        };

        BehavioralSnapshot {
            pages_visited,
            time_on_site_secs: session.duration_secs(),
            events_triggered,
            visits_before_conversion: 1,
        }
    }
}
