//! Error-path tests for lead intake.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};

#[tokio::test]
async fn test_empty_submission_is_rejected() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.post("/leads").json(&serde_json::json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_002");
    assert!(ctx.leads().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/leads")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
}

#[tokio::test]
async fn test_oversized_submission_is_rejected() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let oversized = serde_json::json!({
        "email": "big@example.com",
        "message": "x".repeat(70 * 1024)
    });

    let response = server.post("/leads").json(&oversized).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_003");
}

#[tokio::test]
async fn test_write_failure_surfaces_as_500() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    ctx.set_write_failure(true);

    let response = server
        .post("/leads")
        .json(&fixtures::consultation_submission())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "DB_001");
    assert!(ctx.leads().is_empty());
}

#[tokio::test]
async fn test_lookup_failure_degrades_but_persists() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let session = fixtures::paid_search_session();
    let session_id = session.id;
    ctx.seed_session(session);
    ctx.set_lookup_failure(true);

    let mut submission = fixtures::email_submission("degraded@example.com", "contact");
    submission["sessionId"] = serde_json::json!(session_id);

    let response = server.post("/leads").json(&submission).await;

    // The lead still lands, without session context.
    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["lead"]["pagesVisited"], 0);
    assert_eq!(body["lead"]["sessionId"], serde_json::Value::Null);
    assert_eq!(ctx.leads().len(), 1);
}

#[tokio::test]
async fn test_rate_limit_returns_429_with_retry_after() {
    use api::middleware::rate_limit::RateLimitConfig;

    let ctx = TestContext::with_rate_limit(RateLimitConfig {
        max_per_window: 2,
        window_secs: 60,
    });
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    for _ in 0..2 {
        let ok = server
            .post("/leads")
            .add_header("X-Forwarded-For", "203.0.113.9")
            .json(&fixtures::consultation_submission())
            .await;
        ok.assert_status(StatusCode::CREATED);
    }

    let limited = server
        .post("/leads")
        .add_header("X-Forwarded-For", "203.0.113.9")
        .json(&fixtures::consultation_submission())
        .await;

    limited.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: serde_json::Value = limited.json();
    assert_eq!(body["code"], "RATE_001");
    assert_eq!(limited.header("Retry-After").to_str().unwrap(), "60");

    // A different client is unaffected.
    let other = server
        .post("/leads")
        .add_header("X-Forwarded-For", "198.51.100.7")
        .json(&fixtures::consultation_submission())
        .await;
    other.assert_status(StatusCode::CREATED);
}
