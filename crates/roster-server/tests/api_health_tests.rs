//! Integration tests for the health endpoint

use axum::http::{Method, StatusCode};
use serde_json::json;

mod helpers;
use helpers::setup_test_app;

#[tokio::test]
async fn test_health_reports_database_and_cache() {
    let app = setup_test_app();

    let (status, json) = app.get("/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "healthy");
    assert_eq!(json["data"]["database"], "connected");
    assert_eq!(json["data"]["cache"]["status"], "connected");
    assert_eq!(json["data"]["cache"]["stats"]["backend"], "memory");
}

#[tokio::test]
async fn test_health_counts_cache_activity() {
    let app = setup_test_app();
    let (_, created) = app
        .send_json(
            Method::POST,
            "/api/employees",
            json!({ "first_name": "Ann", "last_name": "Lee", "email": "ann@x.com" }),
        )
        .await;
    let id = created["data"]["id"].as_i64().unwrap();

    app.get(&format!("/api/employees/{id}")).await;
    app.get("/api/employees").await;
    app.get("/api/employees").await;

    let (_, json) = app.get("/api/health").await;
    let stats = &json["data"]["cache"]["stats"];
    assert_eq!(stats["employee_keys"], 1);
    assert_eq!(stats["list_keys"], 1);
    assert_eq!(stats["hits"], 2);
    assert_eq!(stats["misses"], 1);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = setup_test_app();

    let (status, _) = app.get("/api/nothing-here").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
