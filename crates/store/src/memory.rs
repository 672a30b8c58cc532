//! In-memory store implementation.
//!
//! Implements the same traits as the Postgres store, so tests exercise all
//! production code paths except the actual database. Failure injection
//! flags simulate lookup and persistence errors for error-path tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use lead_core::{
    DbErrorCode, Error, LeadRecord, NewLead, RepeatInfo, Result, Session, SessionPatch,
    Touchpoint,
};

use crate::traits::{ActivityStore, LeadStore, SessionStore, TouchpointStore};

/// In-memory datastore.
#[derive(Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<Uuid, Session>>,
    leads: Mutex<Vec<LeadRecord>>,
    touchpoints: Mutex<Vec<Touchpoint>>,
    /// Simulate lookup-query failures if set.
    fail_lookups: AtomicBool,
    /// Simulate persistence failures if set.
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a session directly, bypassing the upsert path.
    pub fn seed_session(&self, session: Session) {
        self.sessions.lock().insert(session.id, session);
    }

    /// Get a stored session by ID.
    pub fn session(&self, id: Uuid) -> Option<Session> {
        self.sessions.lock().get(&id).cloned()
    }

    /// All stored leads, in insertion order.
    pub fn leads(&self) -> Vec<LeadRecord> {
        self.leads.lock().clone()
    }

    /// All stored touchpoints.
    pub fn touchpoints(&self) -> Vec<Touchpoint> {
        self.touchpoints.lock().clone()
    }

    /// Clear all stored records.
    pub fn clear(&self) {
        self.sessions.lock().clear();
        self.leads.lock().clear();
        self.touchpoints.lock().clear();
    }

    /// Make lookup methods fail, for degradation-path tests.
    pub fn set_fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::Relaxed);
    }

    /// Make write methods fail, for fatal-path tests.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    fn check_lookup(&self) -> Result<()> {
        if self.fail_lookups.load(Ordering::Relaxed) {
            return Err(Error::database(
                DbErrorCode::QueryFailed,
                "simulated lookup failure",
            ));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(Error::database(
                DbErrorCode::InsertFailed,
                "simulated write failure",
            ));
        }
        Ok(())
    }

    fn prior_leads_locked(leads: &[LeadRecord], email: &str) -> Vec<LeadRecord> {
        let mut prior: Vec<LeadRecord> = leads
            .iter()
            .filter(|l| {
                l.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .cloned()
            .collect();
        prior.sort_by_key(|l| l.created_at);
        prior
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn find_by_session_id(&self, id: Uuid) -> Result<Option<Session>> {
        self.check_lookup()?;
        Ok(self.sessions.lock().get(&id).cloned())
    }

    async fn upsert_session(&self, id: Uuid, patch: SessionPatch) -> Result<Session> {
        self.check_write()?;
        let mut sessions = self.sessions.lock();
        let session = sessions
            .entry(id)
            .and_modify(|s| s.record_page_view(patch.clone()))
            .or_insert_with(|| Session::new(id, patch));
        Ok(session.clone())
    }

    async fn mark_converted(&self, id: Uuid) -> Result<()> {
        self.check_write()?;
        if let Some(session) = self.sessions.lock().get_mut(&id) {
            session.mark_converted();
        }
        Ok(())
    }
}

#[async_trait]
impl LeadStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Vec<LeadRecord>> {
        self.check_lookup()?;
        Ok(Self::prior_leads_locked(&self.leads.lock(), email))
    }

    async fn insert_lead(&self, lead: NewLead) -> Result<LeadRecord> {
        self.check_write()?;

        // The single mutex plays the role of the advisory email lock: the
        // prior-lead scan and the insert are one critical section.
        let mut leads = self.leads.lock();
        let repeat = match lead.email.as_deref() {
            Some(email) if !email.trim().is_empty() => {
                RepeatInfo::from_prior(&Self::prior_leads_locked(&leads, email))
            }
            _ => RepeatInfo::none(),
        };

        let record = LeadRecord::from_new(lead, repeat);
        leads.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl TouchpointStore for MemoryStore {
    async fn insert_many(&self, touchpoints: Vec<Touchpoint>) -> Result<()> {
        self.check_write()?;
        self.touchpoints.lock().extend(touchpoints);
        Ok(())
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn page_view_count(&self, session_id: Uuid) -> Result<u64> {
        self.check_lookup()?;
        Ok(self
            .sessions
            .lock()
            .get(&session_id)
            .map(|s| s.page_views as u64)
            .unwrap_or(0))
    }

    async fn event_count(&self, session_id: Uuid) -> Result<u64> {
        self.check_lookup()?;
        Ok(self
            .sessions
            .lock()
            .get(&session_id)
            .map(|s| s.events as u64)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use lead_core::{AcquisitionFields, BehavioralSnapshot};

    fn new_lead(email: Option<&str>, created_offset_secs: i64) -> NewLead {
        NewLead {
            id: Uuid::new_v4(),
            session_id: None,
            name: None,
            email: email.map(Into::into),
            phone: None,
            company: None,
            message: None,
            form_type: None,
            payload: serde_json::Value::Null,
            acquisition: AcquisitionFields::default(),
            lead_score: 30,
            behavior: BehavioralSnapshot::default(),
            original_source: "direct".into(),
            last_source: "direct".into(),
            created_at: Utc::now() + Duration::seconds(created_offset_secs),
        }
    }

    #[tokio::test]
    async fn test_repeat_detection_orders_by_creation() {
        let store = MemoryStore::new();

        // Insert out of chronological order; detection must still pick the
        // earliest as the original.
        let l2 = store.insert_lead(new_lead(Some("a@x.com"), 10)).await.unwrap();
        let l1 = store.insert_lead(new_lead(Some("a@x.com"), 0)).await.unwrap();
        let l3 = store.insert_lead(new_lead(Some("A@X.COM"), 20)).await.unwrap();

        assert!(!l2.is_repeat_lead);
        assert!(l1.is_repeat_lead);
        assert!(l3.is_repeat_lead);

        let l4 = store.insert_lead(new_lead(Some("a@x.com"), 30)).await.unwrap();
        assert!(l4.is_repeat_lead);
        assert_eq!(l4.original_lead_id, Some(l1.id));
        assert_eq!(l4.previous_lead_count, 3);
    }

    #[tokio::test]
    async fn test_no_email_means_no_repeat() {
        let store = MemoryStore::new();
        store.insert_lead(new_lead(None, 0)).await.unwrap();
        let lead = store.insert_lead(new_lead(None, 1)).await.unwrap();
        assert!(!lead.is_repeat_lead);
        assert_eq!(lead.previous_lead_count, 0);
    }

    #[tokio::test]
    async fn test_upsert_increments_page_views() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();

        let first = store.upsert_session(id, SessionPatch::default()).await.unwrap();
        assert_eq!(first.page_views, 1);

        let second = store.upsert_session(id, SessionPatch::default()).await.unwrap();
        assert_eq!(second.page_views, 2);

        assert_eq!(store.page_view_count(id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_mark_converted_missing_session_is_noop() {
        let store = MemoryStore::new();
        store.mark_converted(Uuid::new_v4()).await.unwrap();
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryStore::new();

        store.set_fail_lookups(true);
        let err = store.find_by_email("a@x.com").await.unwrap_err();
        assert!(err.is_lookup_failure());
        // Writes still work while lookups fail.
        store.insert_lead(new_lead(Some("a@x.com"), 0)).await.unwrap();

        store.set_fail_lookups(false);
        store.set_fail_writes(true);
        let err = store.insert_lead(new_lead(Some("a@x.com"), 1)).await.unwrap_err();
        assert_eq!(err.error_code(), Some("DB_001"));
    }
}
