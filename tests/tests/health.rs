//! Health endpoint tests.

use axum_test::TestServer;
use integration_tests::setup::TestContext;

#[tokio::test]
async fn test_health_reports_datastore() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["datastore_connected"], true);
}

#[tokio::test]
async fn test_readiness_probe() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server.get("/health/ready").await.assert_status_ok();
}

#[tokio::test]
async fn test_liveness_probe() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server.get("/health/live").await.assert_status_ok();
}
