//! Store trait implementations over Postgres.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

use lead_core::{
    AcquisitionFields, BehavioralSnapshot, DbErrorCode, Error, LeadRecord, NewLead, RepeatInfo,
    Result, Session, SessionPatch, Touchpoint, MAX_SCORE,
};
use lead_store::{ActivityStore, LeadStore, SessionStore, TouchpointStore};

use crate::client::PostgresClient;

/// Postgres-backed implementation of every store contract.
#[derive(Clone)]
pub struct PostgresStore {
    client: PostgresClient,
}

impl PostgresStore {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }

    fn pool(&self) -> &PgPool {
        self.client.pool()
    }
}

fn query_err(e: sqlx::Error) -> Error {
    Error::database(DbErrorCode::QueryFailed, e.to_string())
}

fn insert_err(e: sqlx::Error) -> Error {
    Error::database(DbErrorCode::InsertFailed, e.to_string())
}

#[derive(FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: Option<String>,
    ip: Option<String>,
    user_agent: Option<String>,
    utm_source: Option<String>,
    utm_medium: Option<String>,
    utm_campaign: Option<String>,
    utm_term: Option<String>,
    utm_content: Option<String>,
    gclid: Option<String>,
    dclid: Option<String>,
    fbclid: Option<String>,
    msclkid: Option<String>,
    ttclid: Option<String>,
    twclid: Option<String>,
    li_fat_id: Option<String>,
    sccid: Option<String>,
    landing_page: Option<String>,
    referrer: Option<String>,
    page_views: i32,
    events: i32,
    converted: bool,
    started_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            user_id: row.user_id,
            ip: row.ip,
            user_agent: row.user_agent,
            acquisition: AcquisitionFields {
                utm_source: row.utm_source,
                utm_medium: row.utm_medium,
                utm_campaign: row.utm_campaign,
                utm_term: row.utm_term,
                utm_content: row.utm_content,
                gclid: row.gclid,
                dclid: row.dclid,
                fbclid: row.fbclid,
                msclkid: row.msclkid,
                ttclid: row.ttclid,
                twclid: row.twclid,
                li_fat_id: row.li_fat_id,
                sccid: row.sccid,
            },
            landing_page: row.landing_page,
            referrer: row.referrer,
            page_views: row.page_views.max(0) as u32,
            events: row.events.max(0) as u32,
            converted: row.converted,
            started_at: row.started_at,
            last_active_at: row.last_active_at,
        }
    }
}

#[derive(FromRow)]
struct LeadRow {
    id: Uuid,
    session_id: Option<Uuid>,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    company: Option<String>,
    message: Option<String>,
    form_type: Option<String>,
    payload: serde_json::Value,
    utm_source: Option<String>,
    utm_medium: Option<String>,
    utm_campaign: Option<String>,
    utm_term: Option<String>,
    utm_content: Option<String>,
    gclid: Option<String>,
    dclid: Option<String>,
    fbclid: Option<String>,
    msclkid: Option<String>,
    ttclid: Option<String>,
    twclid: Option<String>,
    li_fat_id: Option<String>,
    sccid: Option<String>,
    lead_score: i16,
    pages_visited: i32,
    time_on_site_secs: i32,
    events_triggered: i32,
    visits_before_conversion: i32,
    original_source: String,
    last_source: String,
    is_repeat_lead: bool,
    original_lead_id: Option<Uuid>,
    previous_lead_count: i32,
    created_at: DateTime<Utc>,
}

impl From<LeadRow> for LeadRecord {
    fn from(row: LeadRow) -> Self {
        LeadRecord {
            id: row.id,
            session_id: row.session_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            company: row.company,
            message: row.message,
            form_type: row.form_type,
            payload: row.payload,
            acquisition: AcquisitionFields {
                utm_source: row.utm_source,
                utm_medium: row.utm_medium,
                utm_campaign: row.utm_campaign,
                utm_term: row.utm_term,
                utm_content: row.utm_content,
                gclid: row.gclid,
                dclid: row.dclid,
                fbclid: row.fbclid,
                msclkid: row.msclkid,
                ttclid: row.ttclid,
                twclid: row.twclid,
                li_fat_id: row.li_fat_id,
                sccid: row.sccid,
            },
            lead_score: row.lead_score.clamp(0, MAX_SCORE as i16) as u8,
            behavior: BehavioralSnapshot {
                pages_visited: row.pages_visited.max(0) as u32,
                time_on_site_secs: row.time_on_site_secs.max(0) as u32,
                events_triggered: row.events_triggered.max(0) as u32,
                visits_before_conversion: row.visits_before_conversion.max(0) as u32,
            },
            original_source: row.original_source,
            last_source: row.last_source,
            is_repeat_lead: row.is_repeat_lead,
            original_lead_id: row.original_lead_id,
            previous_lead_count: row.previous_lead_count.max(0) as u32,
            created_at: row.created_at,
        }
    }
}

const UPSERT_SESSION_SQL: &str = r#"
INSERT INTO sessions (
    id, user_id, ip, user_agent,
    utm_source, utm_medium, utm_campaign, utm_term, utm_content,
    gclid, dclid, fbclid, msclkid, ttclid, twclid, li_fat_id, sccid,
    landing_page, referrer, page_views, events, converted,
    started_at, last_active_at
)
VALUES (
    $1, $2, $3, $4,
    $5, $6, $7, $8, $9,
    $10, $11, $12, $13, $14, $15, $16, $17,
    $18, $19, 1, 0, FALSE,
    $20, $20
)
ON CONFLICT (id) DO UPDATE SET
    user_id = COALESCE(sessions.user_id, EXCLUDED.user_id),
    ip = COALESCE(sessions.ip, EXCLUDED.ip),
    user_agent = COALESCE(sessions.user_agent, EXCLUDED.user_agent),
    utm_source = COALESCE(sessions.utm_source, EXCLUDED.utm_source),
    utm_medium = COALESCE(sessions.utm_medium, EXCLUDED.utm_medium),
    utm_campaign = COALESCE(sessions.utm_campaign, EXCLUDED.utm_campaign),
    utm_term = COALESCE(sessions.utm_term, EXCLUDED.utm_term),
    utm_content = COALESCE(sessions.utm_content, EXCLUDED.utm_content),
    gclid = COALESCE(sessions.gclid, EXCLUDED.gclid),
    dclid = COALESCE(sessions.dclid, EXCLUDED.dclid),
    fbclid = COALESCE(sessions.fbclid, EXCLUDED.fbclid),
    msclkid = COALESCE(sessions.msclkid, EXCLUDED.msclkid),
    ttclid = COALESCE(sessions.ttclid, EXCLUDED.ttclid),
    twclid = COALESCE(sessions.twclid, EXCLUDED.twclid),
    li_fat_id = COALESCE(sessions.li_fat_id, EXCLUDED.li_fat_id),
    sccid = COALESCE(sessions.sccid, EXCLUDED.sccid),
    landing_page = COALESCE(sessions.landing_page, EXCLUDED.landing_page),
    referrer = COALESCE(sessions.referrer, EXCLUDED.referrer),
    page_views = sessions.page_views + 1,
    last_active_at = EXCLUDED.last_active_at
RETURNING *
"#;

const FIND_PRIOR_LEADS_SQL: &str = r#"
SELECT * FROM leads
WHERE email IS NOT NULL AND lower(email) = lower($1)
ORDER BY created_at ASC
"#;

const INSERT_LEAD_SQL: &str = r#"
INSERT INTO leads (
    id, session_id, name, email, phone, company, message, form_type, payload,
    utm_source, utm_medium, utm_campaign, utm_term, utm_content,
    gclid, dclid, fbclid, msclkid, ttclid, twclid, li_fat_id, sccid,
    lead_score,
    pages_visited, time_on_site_secs, events_triggered, visits_before_conversion,
    original_source, last_source,
    is_repeat_lead, original_lead_id, previous_lead_count,
    created_at
)
VALUES (
    $1, $2, $3, $4, $5, $6, $7, $8, $9,
    $10, $11, $12, $13, $14,
    $15, $16, $17, $18, $19, $20, $21, $22,
    $23,
    $24, $25, $26, $27,
    $28, $29,
    $30, $31, $32,
    $33
)
"#;

const INSERT_TOUCHPOINT_SQL: &str = r#"
INSERT INTO touchpoints (
    id, lead_id, session_id, touch_type, channel,
    source, medium, campaign, occurred_at, model, weight
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
"#;

#[async_trait]
impl SessionStore for PostgresStore {
    async fn find_by_session_id(&self, id: Uuid) -> Result<Option<Session>> {
        let row: Option<SessionRow> =
            sqlx::query_as("SELECT * FROM sessions WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool())
                .await
                .map_err(query_err)?;

        Ok(row.map(Session::from))
    }

    async fn upsert_session(&self, id: Uuid, patch: SessionPatch) -> Result<Session> {
        let now = Utc::now();
        let a = &patch.acquisition;

        let row: SessionRow = sqlx::query_as(UPSERT_SESSION_SQL)
            .bind(id)
            .bind(&patch.user_id)
            .bind(&patch.ip)
            .bind(&patch.user_agent)
            .bind(&a.utm_source)
            .bind(&a.utm_medium)
            .bind(&a.utm_campaign)
            .bind(&a.utm_term)
            .bind(&a.utm_content)
            .bind(&a.gclid)
            .bind(&a.dclid)
            .bind(&a.fbclid)
            .bind(&a.msclkid)
            .bind(&a.ttclid)
            .bind(&a.twclid)
            .bind(&a.li_fat_id)
            .bind(&a.sccid)
            .bind(&patch.landing_page)
            .bind(&patch.referrer)
            .bind(now)
            .fetch_one(self.pool())
            .await
            .map_err(insert_err)?;

        Ok(Session::from(row))
    }

    async fn mark_converted(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE sessions SET converted = TRUE WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(query_err)?;

        Ok(())
    }
}

#[async_trait]
impl LeadStore for PostgresStore {
    async fn find_by_email(&self, email: &str) -> Result<Vec<LeadRecord>> {
        let rows: Vec<LeadRow> = sqlx::query_as(FIND_PRIOR_LEADS_SQL)
            .bind(email)
            .fetch_all(self.pool())
            .await
            .map_err(query_err)?;

        Ok(rows.into_iter().map(LeadRecord::from).collect())
    }

    async fn insert_lead(&self, lead: NewLead) -> Result<LeadRecord> {
        let email = lead
            .email
            .as_deref()
            .map(|e| e.trim().to_ascii_lowercase())
            .filter(|e| !e.is_empty());

        let mut tx = self.pool().begin().await.map_err(insert_err)?;

        // Repeat detection runs inside the insert transaction while holding
        // an advisory lock on the normalized email, so a concurrent insert
        // for the same address waits and sees this lead as prior.
        let repeat = match &email {
            Some(email) => {
                let prior: std::result::Result<Vec<LeadRow>, sqlx::Error> = async {
                    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                        .bind(email.as_str())
                        .execute(&mut *tx)
                        .await?;
                    sqlx::query_as(FIND_PRIOR_LEADS_SQL)
                        .bind(email.as_str())
                        .fetch_all(&mut *tx)
                        .await
                }
                .await;

                match prior {
                    Ok(rows) => {
                        let records: Vec<LeadRecord> =
                            rows.into_iter().map(LeadRecord::from).collect();
                        RepeatInfo::from_prior(&records)
                    }
                    Err(e) => {
                        // Lookup failures degrade: the lead still persists,
                        // recorded as a first lead. The transaction is
                        // poisoned at this point, so start over without it.
                        warn!(error = %e, "Repeat-lead lookup failed, recording as first lead");
                        if let Err(e) = tx.rollback().await {
                            warn!(error = %e, "Rollback after failed lookup also failed");
                        }
                        tx = self.pool().begin().await.map_err(insert_err)?;
                        RepeatInfo::none()
                    }
                }
            }
            None => RepeatInfo::none(),
        };

        let record = LeadRecord::from_new(lead, repeat);
        let a = &record.acquisition;
        let b = &record.behavior;

        sqlx::query(INSERT_LEAD_SQL)
            .bind(record.id)
            .bind(record.session_id)
            .bind(&record.name)
            .bind(&record.email)
            .bind(&record.phone)
            .bind(&record.company)
            .bind(&record.message)
            .bind(&record.form_type)
            .bind(&record.payload)
            .bind(&a.utm_source)
            .bind(&a.utm_medium)
            .bind(&a.utm_campaign)
            .bind(&a.utm_term)
            .bind(&a.utm_content)
            .bind(&a.gclid)
            .bind(&a.dclid)
            .bind(&a.fbclid)
            .bind(&a.msclkid)
            .bind(&a.ttclid)
            .bind(&a.twclid)
            .bind(&a.li_fat_id)
            .bind(&a.sccid)
            .bind(record.lead_score as i16)
            .bind(b.pages_visited as i32)
            .bind(b.time_on_site_secs as i32)
            .bind(b.events_triggered as i32)
            .bind(b.visits_before_conversion as i32)
            .bind(&record.original_source)
            .bind(&record.last_source)
            .bind(record.is_repeat_lead)
            .bind(record.original_lead_id)
            .bind(record.previous_lead_count as i32)
            .bind(record.created_at)
            .execute(&mut *tx)
            .await
            .map_err(insert_err)?;

        tx.commit().await.map_err(insert_err)?;

        Ok(record)
    }
}

#[async_trait]
impl TouchpointStore for PostgresStore {
    async fn insert_many(&self, touchpoints: Vec<Touchpoint>) -> Result<()> {
        if touchpoints.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool().begin().await.map_err(insert_err)?;

        for tp in &touchpoints {
            sqlx::query(INSERT_TOUCHPOINT_SQL)
                .bind(tp.id)
                .bind(tp.lead_id)
                .bind(tp.session_id)
                .bind(tp.touch_type.as_str())
                .bind(tp.channel.as_str())
                .bind(&tp.source)
                .bind(&tp.medium)
                .bind(&tp.campaign)
                .bind(tp.occurred_at)
                .bind(tp.model.as_str())
                .bind(tp.weight)
                .execute(&mut *tx)
                .await
                .map_err(insert_err)?;
        }

        tx.commit().await.map_err(insert_err)?;

        Ok(())
    }
}

#[async_trait]
impl ActivityStore for PostgresStore {
    async fn page_view_count(&self, session_id: Uuid) -> Result<u64> {
        let count: Option<i32> =
            sqlx::query_scalar("SELECT page_views FROM sessions WHERE id = $1")
                .bind(session_id)
                .fetch_optional(self.pool())
                .await
                .map_err(query_err)?;

        Ok(count.map(|n| n.max(0) as u64).unwrap_or(0))
    }

    async fn event_count(&self, session_id: Uuid) -> Result<u64> {
        let count: Option<i32> =
            sqlx::query_scalar("SELECT events FROM sessions WHERE id = $1")
                .bind(session_id)
                .fetch_optional(self.pool())
                .await
                .map_err(query_err)?;

        Ok(count.map(|n| n.max(0) as u64).unwrap_or(0))
    }
}
