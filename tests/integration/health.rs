//! Health endpoint integration tests
//!
//! Tests for the health check endpoints:
//! - GET /health - Full health check with dependency status
//! - GET /health/ready - Readiness probe
//! - GET /health/live - Liveness probe

use axum::http::StatusCode;
use serde_json::Value;

use crate::common::TestApp;

#[tokio::test]
async fn test_health_endpoint_returns_proper_structure() {
    let app = TestApp::new().await;

    let response = app.server.get("/health").await;

    response.assert_status_ok();

    let json: Value = response.json();

    assert!(json.get("version").is_some(), "Response should have 'version' field");
    assert!(json.get("uptime_seconds").is_some(), "Response should have 'uptime_seconds' field");
    assert!(json.get("timestamp").is_some(), "Response should have 'timestamp' field");
    assert_eq!(json["status"], "healthy");

    let checks = &json["checks"];
    assert_eq!(checks["cache"]["status"], "healthy");
    assert_eq!(checks["database"]["status"], "healthy");
    assert!(checks["cache"].get("latency_ms").is_some());
    assert!(checks["cache"].get("error").is_none(), "Healthy checks omit 'error'");

    assert_eq!(json["stats"]["cache_backend"], "in-memory");
}

#[tokio::test]
async fn test_health_reports_degraded_when_cache_is_down() {
    let app = TestApp::new().await;
    app.kv.set_failing(true);

    let response = app.server.get("/health").await;

    // Reads still work from the database, so the service stays up
    response.assert_status_ok();

    let json: Value = response.json();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["cache"]["status"], "unhealthy");
    assert!(json["checks"]["cache"]["error"].is_string());
    assert_eq!(json["checks"]["database"]["status"], "healthy");
}

#[tokio::test]
async fn test_health_ready_endpoint() {
    let app = TestApp::new().await;

    let response = app.server.get("/health/ready").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_health_ready_ignores_cache_outage() {
    let app = TestApp::new().await;
    app.kv.set_failing(true);

    let response = app.server.get("/health/ready").await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_health_live_endpoint() {
    let app = TestApp::new().await;

    let response = app.server.get("/health/live").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_path_returns_404() {
    let app = TestApp::new().await;

    let response = app.server.get("/health/unknown").await;

    response.assert_status(StatusCode::NOT_FOUND);
}
