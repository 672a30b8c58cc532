//! End-to-end tests for lead intake.
//!
//! These run the full flow over HTTP: POST /leads → pipeline →
//! in-memory store, exercising validation, scoring, attribution, repeat
//! detection, and the persisted side effects.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};
use lead_core::{Channel, TouchType};

#[tokio::test]
async fn test_consultation_submission_scores_55() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/leads")
        .json(&fixtures::consultation_submission())
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    // name 10 + email 20 + consultation form 25
    assert_eq!(body["lead"]["leadScore"], 55);
    assert_eq!(body["lead"]["originalSource"], "direct");
    assert_eq!(body["lead"]["lastSource"], "direct");
    assert_eq!(body["lead"]["isRepeatLead"], false);

    assert_eq!(ctx.leads().len(), 1);
    assert!(ctx.touchpoints().is_empty());
}

#[tokio::test]
async fn test_paid_search_session_attribution() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let session = fixtures::paid_search_session();
    let session_id = session.id;
    ctx.seed_session(session);

    let mut submission = fixtures::email_submission("buyer@example.com", "valuation");
    submission["sessionId"] = serde_json::json!(session_id);

    let response = server.post("/leads").json(&submission).await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    // email 20 + pages 5*3 + events 1*2 + google 10 + cpc 5 + gclid 5
    // + valuation 20
    assert_eq!(body["lead"]["leadScore"], 77);
    assert_eq!(body["lead"]["originalSource"], "google");
    assert_eq!(body["lead"]["pagesVisited"], 5);
    assert_eq!(body["lead"]["eventsTriggered"], 1);

    // The session is converted and the touch chain is persisted.
    assert!(ctx.session(session_id).expect("session").converted);
    let touchpoints = ctx.touchpoints();
    assert_eq!(touchpoints.len(), 1);
    assert_eq!(touchpoints[0].touch_type, TouchType::FirstTouch);
    assert_eq!(touchpoints[0].channel, Channel::Paid);
    assert_eq!(touchpoints[0].source, "google");
    assert_eq!(touchpoints[0].weight, 1.0);
    assert_eq!(touchpoints[0].session_id, Some(session_id));
}

#[tokio::test]
async fn test_anonymous_acquisition_only_submission_scores_30() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/leads")
        .json(&serde_json::json!({
            "utmSource": "google",
            "utmMedium": "cpc",
            "gclid": "Cj0KCQ"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    // google 10 + cpc 5 + gclid 5 + default form type 10, no contact fields.
    assert_eq!(body["lead"]["leadScore"], 30);
    assert_eq!(body["lead"]["originalSource"], "google");
    assert_eq!(body["lead"]["email"], serde_json::Value::Null);

    assert_eq!(ctx.leads().len(), 1);
    assert_eq!(ctx.touchpoints().len(), 1);
}

#[tokio::test]
async fn test_repeat_lead_across_three_submissions() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let first = server
        .post("/leads")
        .json(&fixtures::email_submission("repeat@example.com", "contact"))
        .await;
    first.assert_status(StatusCode::CREATED);
    let first_body: serde_json::Value = first.json();
    let first_id = first_body["lead"]["id"].clone();
    assert_eq!(first_body["lead"]["isRepeatLead"], false);

    let second = server
        .post("/leads")
        .json(&fixtures::email_submission("repeat@example.com", "contact"))
        .await;
    second.assert_status(StatusCode::CREATED);

    let third = server
        .post("/leads")
        // Email matching is case-insensitive.
        .json(&fixtures::email_submission("Repeat@Example.com", "viewing"))
        .await;
    third.assert_status(StatusCode::CREATED);
    let third_body: serde_json::Value = third.json();

    assert_eq!(third_body["lead"]["isRepeatLead"], true);
    assert_eq!(third_body["lead"]["previousLeadCount"], 2);
    // Points at the chronologically first lead, not the most recent.
    assert_eq!(third_body["lead"]["originalLeadId"], first_id);
}

#[tokio::test]
async fn test_client_profile_scoring_endpoint() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/clients/score")
        .json(&fixtures::full_client_profile())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    // budget 20 + referral 20 + capital growth 15 + high risk 10
    // + completeness 5+4+3+3+5
    assert_eq!(body["score"], 85);

    // Nothing persisted.
    assert!(ctx.leads().is_empty());
}

#[tokio::test]
async fn test_empty_client_profile_scores_zero() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.post("/clients/score").json(&serde_json::json!({})).await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["score"], 0);
}
