//! Integration tests for health endpoints.

mod helpers;

use axum::http::StatusCode;

#[tokio::test]
async fn test_health() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["status"], "ok");
    assert!(response.body["data"]["version"].is_string());
}

#[tokio::test]
async fn test_health_detailed_reports_backends() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health/detailed", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["status"], "ok");
    assert_eq!(data["database"]["backend"], "memory");
    assert_eq!(data["storage"]["backend"], "local");
    assert!(data["storage"].get("error").is_none());
}

#[tokio::test]
async fn test_unknown_route() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/files", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
