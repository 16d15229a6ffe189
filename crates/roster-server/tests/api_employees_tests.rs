//! Integration tests for the employee record endpoints

use axum::http::{Method, StatusCode};
use serde_json::json;

mod helpers;
use helpers::setup_test_app;

fn ann() -> serde_json::Value {
    json!({
        "first_name": "Ann",
        "last_name": "Lee",
        "email": "ann@example.com",
        "company_name": "Acme",
        "city": "Leeds"
    })
}

#[tokio::test]
async fn test_list_employees_empty() {
    let app = setup_test_app();

    let (status, json) = app.get("/api/employees").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
    assert_eq!(json["meta"]["pagination"]["page"], 1);
    assert_eq!(json["meta"]["pagination"]["limit"], 20);
    assert_eq!(json["meta"]["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_create_and_get_employee() {
    let app = setup_test_app();

    let (status, json) = app.send_json(Method::POST, "/api/employees", ann()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["full_name"], "Ann Lee");
    assert_eq!(json["data"]["city"], "Leeds");
    let id = json["data"]["id"].as_i64().unwrap();

    let (status, json) = app.get(&format!("/api/employees/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["email"], "ann@example.com");
    assert_eq!(json["data"]["phone"], "");
}

#[tokio::test]
async fn test_create_reports_every_invalid_field() {
    let app = setup_test_app();

    let (status, json) = app
        .send_json(
            Method::POST,
            "/api/employees",
            json!({ "first_name": "A", "last_name": "Lee", "email": "not-an-email", "web": "nope" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    let fields: Vec<_> = json["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["FirstName", "Email", "Web"]);
}

#[tokio::test]
async fn test_create_duplicate_email_conflicts() {
    let app = setup_test_app();

    app.send_json(Method::POST, "/api/employees", ann()).await;
    let (status, json) = app.send_json(Method::POST, "/api/employees", ann()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "CONFLICT");
    assert_eq!(
        json["error"]["message"],
        "employee with email ann@example.com already exists"
    );
}

#[tokio::test]
async fn test_get_employee_not_found() {
    let app = setup_test_app();

    let (status, json) = app.get("/api/employees/404").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
    assert_eq!(json["error"]["message"], "employee with ID 404 not found");
}

#[tokio::test]
async fn test_update_employee_partially() {
    let app = setup_test_app();
    let (_, created) = app.send_json(Method::POST, "/api/employees", ann()).await;
    let id = created["data"]["id"].as_i64().unwrap();

    // Prime the record cache so the update has to refresh it
    app.get(&format!("/api/employees/{id}")).await;

    let (status, json) = app
        .send_json(
            Method::PUT,
            &format!("/api/employees/{id}"),
            json!({ "city": "York", "company_name": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["city"], "York");
    assert_eq!(json["data"]["company_name"], "");
    assert_eq!(json["data"]["first_name"], "Ann");

    let (_, json) = app.get(&format!("/api/employees/{id}")).await;
    assert_eq!(json["data"]["city"], "York");
}

#[tokio::test]
async fn test_update_rejects_empty_body_and_unknown_id() {
    let app = setup_test_app();
    let (_, created) = app.send_json(Method::POST, "/api/employees", ann()).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let (status, json) = app
        .send_json(Method::PUT, &format!("/api/employees/{id}"), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .send_json(Method::PUT, "/api/employees/9999", json!({ "city": "York" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_to_taken_email_conflicts() {
    let app = setup_test_app();
    app.send_json(Method::POST, "/api/employees", ann()).await;
    let (_, bo) = app
        .send_json(
            Method::POST,
            "/api/employees",
            json!({ "first_name": "Bo", "last_name": "Ray", "email": "bo@example.com" }),
        )
        .await;
    let id = bo["data"]["id"].as_i64().unwrap();

    let (status, json) = app
        .send_json(
            Method::PUT,
            &format!("/api/employees/{id}"),
            json!({ "email": "ann@example.com" }),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_delete_employee() {
    let app = setup_test_app();
    let (_, created) = app.send_json(Method::POST, "/api/employees", ann()).await;
    let id = created["data"]["id"].as_i64().unwrap();
    app.get(&format!("/api/employees/{id}")).await;

    let (status, json) = app.delete(&format!("/api/employees/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["email"], "ann@example.com");

    // The cached copy went with it
    let (status, _) = app.get(&format!("/api/employees/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/api/employees/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_paginates_and_searches() {
    let app = setup_test_app();
    for i in 0..25 {
        let company = if i < 5 { "Globex" } else { "Acme" };
        app.send_json(
            Method::POST,
            "/api/employees",
            json!({
                "first_name": format!("Emp{i:02}"),
                "last_name": "Smith",
                "email": format!("emp{i}@example.com"),
                "company_name": company
            }),
        )
        .await;
    }

    let (status, json) = app.get("/api/employees?page=3&limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 5);
    let pagination = &json["meta"]["pagination"];
    assert_eq!(pagination["total"], 25);
    assert_eq!(pagination["total_pages"], 3);
    assert_eq!(pagination["has_next"], false);
    assert_eq!(pagination["has_prev"], true);

    let (_, json) = app.get("/api/employees?search=globex").await;
    assert_eq!(json["meta"]["pagination"]["total"], 5);

    let (_, json) = app.get("/api/employees?limit=500").await;
    assert_eq!(json["meta"]["pagination"]["limit"], 20);
    assert_eq!(json["data"].as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn test_create_invalidates_cached_lists() {
    let app = setup_test_app();
    app.send_json(Method::POST, "/api/employees", ann()).await;

    let (_, json) = app.get("/api/employees").await;
    assert_eq!(json["meta"]["pagination"]["total"], 1);

    app.send_json(
        Method::POST,
        "/api/employees",
        json!({ "first_name": "Bo", "last_name": "Ray", "email": "bo@example.com" }),
    )
    .await;

    let (_, json) = app.get("/api/employees").await;
    assert_eq!(json["meta"]["pagination"]["total"], 2);
}

#[tokio::test]
async fn test_list_far_past_the_last_page_is_empty() {
    let app = setup_test_app();
    app.send_json(Method::POST, "/api/employees", ann()).await;

    let (status, json) = app
        .get("/api/employees?page=9223372036854775807")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
    assert_eq!(json["meta"]["pagination"]["total"], 1);
    assert_eq!(json["meta"]["pagination"]["has_next"], false);
}
