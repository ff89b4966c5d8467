//! Integration tests for the JSON endpoints and the viewer page.

use axum::http::StatusCode;
use relay_core::events::AccountStatus;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_health_before_tracker_starts() {
    let app = TestApp::new(AccountStatus::Online);

    let response = app.request("GET", "/api/health").await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["status"], "ok");
    assert_eq!(data["tracker"], "idle");
    assert_eq!(data["observers"], 0);
    assert_eq!(data["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_presence_is_connecting_until_resolved() {
    let app = TestApp::new(AccountStatus::Online);

    let response = app.request("GET", "/api/presence").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        serde_json::json!({
            "name": app.config.target.name,
            "status": "CONNECTING",
            "last_seen": "--",
            "duration": ""
        })
    );
}

#[tokio::test]
async fn test_presence_after_initial_sync() {
    let app = TestApp::new(AccountStatus::Online);
    let _tracker = app.start_tracker().await;

    let response = app.request("GET", "/api/presence").await;
    assert_eq!(response.body["status"], "ONLINE");

    let health = app.request("GET", "/api/health").await;
    assert_eq!(health.body["data"]["tracker"], "running");
    assert_eq!(health.body["data"]["metrics"]["snapshots_broadcast"], 1);
}

#[tokio::test]
async fn test_health_reports_failed_tracker() {
    let app = TestApp::with_config(AccountStatus::Online, |config| {
        config.target.identifier = "@nobody".to_string();
    });
    let handle = app.engine.spawn_tracker(app.session.clone());
    let err = handle.await.expect("join").expect_err("resolution must fail");
    assert!(err.is_resolution());

    let health = app.request("GET", "/api/health").await;
    assert_eq!(health.body["data"]["status"], "degraded");
    assert_eq!(health.body["data"]["tracker"], "failed");
}

#[tokio::test]
async fn test_index_page() {
    let app = TestApp::new(AccountStatus::Online);

    let response = app.request("GET", "/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.content_type.starts_with("text/html"));
    assert!(response.text.contains("/ws"));
}

#[tokio::test]
async fn test_static_assets() {
    let app = TestApp::new(AccountStatus::Online);

    let response = app.request("GET", "/static/index.html").await;
    assert_eq!(response.status, StatusCode::OK);

    let missing = app.request("GET", "/static/missing.css").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_index_page_is_not_found() {
    let app = TestApp::with_config(AccountStatus::Online, |config| {
        config.web.index_file = "absent.html".to_string();
    });

    let response = app.request("GET", "/").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_ws_requires_upgrade() {
    let app = TestApp::new(AccountStatus::Online);

    let response = app.request("GET", "/ws").await;

    assert!(
        response.status == StatusCode::BAD_REQUEST
            || response.status == StatusCode::UPGRADE_REQUIRED,
        "Expected 400 or 426, got {}",
        response.status
    );
    assert_eq!(app.engine.hub.observer_count(), 0);
}
