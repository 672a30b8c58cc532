//! Test fixtures for lead submissions and sessions.

use lead_core::{AcquisitionFields, Session, SessionPatch};
use serde_json::{json, Value};
use uuid::Uuid;

/// A consultation request with name and email.
///
/// Scores 55: name 10 + email 20 + consultation form 25.
pub fn consultation_submission() -> Value {
    json!({
        "name": "Ana Ferreira",
        "email": "ana@example.com",
        "formType": "consultation",
        "message": "Looking for a two-bedroom in Cascais"
    })
}

/// A submission with only an email address and a given form type.
pub fn email_submission(email: &str, form_type: &str) -> Value {
    json!({
        "email": email,
        "formType": form_type
    })
}

/// A full client profile for the scoring endpoint.
///
/// Scores 85: budget 20 + referral 20 + capital growth 15 + high risk 10
/// + phone 5 + company 4 + nationality 3 + profession 3 + areas 5.
pub fn full_client_profile() -> Value {
    json!({
        "budget": "1m_5m",
        "leadSource": "referral",
        "investmentGoal": "capital_growth",
        "riskTolerance": "high",
        "phone": "+351910000000",
        "company": "Ferreira Holdings",
        "nationality": "PT",
        "profession": "Engineer",
        "preferredAreas": ["Cascais", "Estoril"]
    })
}

/// Seeds a paid-search session: google / cpc with a gclid, four extra page
/// views and one event on top of the landing view.
pub fn paid_search_session() -> Session {
    let mut session = Session::new(
        Uuid::new_v4(),
        SessionPatch {
            referrer: Some("https://www.google.com/".into()),
            landing_page: Some("https://atrium.example/villas".into()),
            acquisition: AcquisitionFields {
                utm_source: Some("google".into()),
                utm_medium: Some("cpc".into()),
                utm_campaign: Some("spring-villas".into()),
                gclid: Some("Cj0KCQiA".into()),
                ..Default::default()
            },
            ..Default::default()
        },
    );
    for _ in 0..4 {
        session.record_page_view(SessionPatch::default());
    }
    session.record_event();
    session
}
