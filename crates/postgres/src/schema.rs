//! Table schemas.
//!
//! All DDL is idempotent so the service can run it on every startup.
//! Acquisition fields are stored as flat columns on both sessions and
//! leads; the repeat-lead index covers the case-insensitive email match.

/// SQL for creating the sessions table.
pub const CREATE_SESSIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    id UUID PRIMARY KEY,
    user_id TEXT,
    ip TEXT,
    user_agent TEXT,

    -- Acquisition (first-touch, never overwritten once set)
    utm_source TEXT,
    utm_medium TEXT,
    utm_campaign TEXT,
    utm_term TEXT,
    utm_content TEXT,
    gclid TEXT,
    dclid TEXT,
    fbclid TEXT,
    msclkid TEXT,
    ttclid TEXT,
    twclid TEXT,
    li_fat_id TEXT,
    sccid TEXT,

    landing_page TEXT,
    referrer TEXT,

    page_views INTEGER NOT NULL DEFAULT 1,
    events INTEGER NOT NULL DEFAULT 0,
    converted BOOLEAN NOT NULL DEFAULT FALSE,

    started_at TIMESTAMPTZ NOT NULL,
    last_active_at TIMESTAMPTZ NOT NULL
)
"#;

/// SQL for creating the leads table.
pub const CREATE_LEADS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS leads (
    id UUID PRIMARY KEY,
    session_id UUID,

    -- Contact
    name TEXT,
    email TEXT,
    phone TEXT,
    company TEXT,
    message TEXT,
    form_type TEXT,

    -- Opaque form payload
    payload JSONB NOT NULL DEFAULT 'null'::jsonb,

    -- Acquisition as resolved at conversion time
    utm_source TEXT,
    utm_medium TEXT,
    utm_campaign TEXT,
    utm_term TEXT,
    utm_content TEXT,
    gclid TEXT,
    dclid TEXT,
    fbclid TEXT,
    msclkid TEXT,
    ttclid TEXT,
    twclid TEXT,
    li_fat_id TEXT,
    sccid TEXT,

    lead_score SMALLINT NOT NULL,

    -- Behavioral snapshot
    pages_visited INTEGER NOT NULL DEFAULT 0,
    time_on_site_secs INTEGER NOT NULL DEFAULT 0,
    events_triggered INTEGER NOT NULL DEFAULT 0,
    visits_before_conversion INTEGER NOT NULL DEFAULT 1,

    -- Attribution summary
    original_source TEXT NOT NULL,
    last_source TEXT NOT NULL,

    -- Repeat detection
    is_repeat_lead BOOLEAN NOT NULL DEFAULT FALSE,
    original_lead_id UUID,
    previous_lead_count INTEGER NOT NULL DEFAULT 0,

    created_at TIMESTAMPTZ NOT NULL
)
"#;

/// Index backing the case-insensitive repeat-lead lookup.
pub const CREATE_LEADS_EMAIL_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_leads_email_created
ON leads (lower(email), created_at)
WHERE email IS NOT NULL
"#;

/// SQL for creating the touchpoints table.
pub const CREATE_TOUCHPOINTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS touchpoints (
    id UUID PRIMARY KEY,
    lead_id UUID NOT NULL,
    session_id UUID,
    touch_type TEXT NOT NULL,
    channel TEXT NOT NULL,
    source TEXT NOT NULL,
    medium TEXT,
    campaign TEXT,
    occurred_at TIMESTAMPTZ NOT NULL,
    model TEXT NOT NULL,
    weight DOUBLE PRECISION NOT NULL
)
"#;

/// Index for fetching a lead's touchpoint chain.
pub const CREATE_TOUCHPOINTS_LEAD_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_touchpoints_lead
ON touchpoints (lead_id, occurred_at)
"#;

/// Returns all DDL statements in creation order.
pub fn all_tables() -> Vec<&'static str> {
    vec![
        CREATE_SESSIONS_TABLE,
        CREATE_LEADS_TABLE,
        CREATE_LEADS_EMAIL_INDEX,
        CREATE_TOUCHPOINTS_TABLE,
        CREATE_TOUCHPOINTS_LEAD_INDEX,
    ]
}
