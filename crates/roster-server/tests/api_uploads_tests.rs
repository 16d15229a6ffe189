//! Integration tests for the spreadsheet upload endpoints

use axum::http::StatusCode;
use roster_server::config::Config;

mod helpers;
use helpers::{setup_test_app, setup_test_app_with, workbook};

const HEADER: &[&str] = &["first_name", "last_name", "email"];

#[tokio::test]
async fn test_upload_counts_valid_and_invalid_rows() {
    let app = setup_test_app();
    let bytes = workbook(&[HEADER, &["Ann", "Lee", "ann@x.com"], &["", "Bo", "bo@x.com"]]);

    let (status, json) = app.upload("/api/employees/upload", "staff.xlsx", &bytes).await;

    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["total_records"], 2);
    assert_eq!(data["valid_records"], 1);
    assert_eq!(data["invalid_records"], 1);
    assert_eq!(data["inserted_records"], 1);
    assert_eq!(data["skipped_records"], 0);
    assert_eq!(data["errors"][0]["field"], "Row 3 - FirstName");
    assert_eq!(data["errors"][0]["message"], "FirstName is required");
    assert_eq!(
        data["message"],
        "Successfully processed 2 records. Inserted: 1 new employees, Invalid: 1"
    );
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn test_reupload_skips_duplicates() {
    let app = setup_test_app();
    let bytes = workbook(&[
        &["Email", "First_Name", "LAST_NAME"],
        &["ann@x.com", "Ann", "Lee"],
        &["bo@x.com", "Bo", "Ray"],
    ]);

    app.upload("/api/employees/upload", "staff.xlsx", &bytes).await;
    let (status, json) = app.upload("/api/employees/upload", "STAFF.XLSX", &bytes).await;

    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["inserted_records"], 0);
    assert_eq!(data["skipped_records"], 2);
    assert_eq!(data["duplicate_emails"], serde_json::json!(["ann@x.com", "bo@x.com"]));
    assert_eq!(
        data["message"],
        "Successfully processed 2 records. Inserted: 0 new employees, \
         Skipped: 2 duplicates (ann@x.com, bo@x.com), Invalid: 0"
    );
    assert_eq!(app.store.len().await, 2);
}

#[tokio::test]
async fn test_upload_refreshes_cached_list() {
    let app = setup_test_app();

    let (_, json) = app.get("/api/employees").await;
    assert_eq!(json["meta"]["pagination"]["total"], 0);

    let bytes = workbook(&[HEADER, &["Ann", "Lee", "ann@x.com"]]);
    app.upload("/api/employees/upload", "staff.xlsx", &bytes).await;

    let (_, json) = app.get("/api/employees").await;
    assert_eq!(json["meta"]["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_upload_without_valid_rows() {
    let app = setup_test_app();
    let bytes = workbook(&[HEADER, &["A", "Lee", "bad"]]);

    let (status, json) = app.upload("/api/employees/upload", "staff.xlsx", &bytes).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["data"]["message"],
        "No valid employee records found in the Excel file"
    );
    assert_eq!(json["data"]["invalid_records"], 2);
    assert_eq!(json["data"]["total_records"], 2);
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_upload_rejects_wrong_extension() {
    let app = setup_test_app();
    let bytes = workbook(&[HEADER, &["Ann", "Lee", "ann@x.com"]]);

    let (status, json) = app.upload("/api/employees/upload", "staff.csv", &bytes).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["details"]["reason"], "INPUT_REJECTED");
    assert_eq!(
        json["error"]["message"],
        "invalid file format. Only .xlsx and .xls files are supported"
    );
}

#[tokio::test]
async fn test_upload_rejects_oversized_file() {
    let mut config = Config::default();
    config.ingest.max_file_size = 64;
    let app = setup_test_app_with(config);
    let bytes = workbook(&[HEADER, &["Ann", "Lee", "ann@x.com"]]);

    let (status, json) = app.upload("/api/employees/upload", "staff.xlsx", &bytes).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["details"]["reason"], "INPUT_REJECTED");
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_upload_reports_missing_headers() {
    let app = setup_test_app();
    let bytes = workbook(&[&["first_name", "surname", "phone"], &["Ann", "Lee", "123"]]);

    let (status, json) = app.upload("/api/employees/upload", "staff.xlsx", &bytes).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let details = &json["error"]["details"];
    assert_eq!(details["reason"], "SCHEMA_MISMATCH");
    assert_eq!(details["missing"], serde_json::json!(["last_name", "email"]));
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let app = setup_test_app();
    let body = helpers::multipart_body("attachment", "staff.xlsx", b"irrelevant");

    let (status, json) = app
        .send(
            axum::http::Request::builder()
                .method(axum::http::Method::POST)
                .uri("/api/employees/upload")
                .header(
                    axum::http::header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", helpers::BOUNDARY),
                )
                .body(axum::body::Body::from(body))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["message"], "No file uploaded");
}

#[tokio::test]
async fn test_validate_excel_is_read_only_and_repeatable() {
    let app = setup_test_app();
    let seed = workbook(&[HEADER, &["Ann", "Lee", "ann@x.com"]]);
    app.upload("/api/employees/upload", "seed.xlsx", &seed).await;

    let bytes = workbook(&[
        HEADER,
        &["Ann", "Lee", "ann@x.com"],
        &["Bo", "Ray", "bo@x.com"],
        &["Bo", "Ray", "bo@x.com"],
        &["", "", ""],
        &["Cy", "Li", "broken"],
    ]);

    let (status, first) = app
        .upload("/api/employees/validate-excel", "check.xlsx", &bytes)
        .await;
    let (_, second) = app
        .upload("/api/employees/validate-excel", "check.xlsx", &bytes)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);

    let data = &first["data"];
    assert_eq!(data["total_records"], 4);
    assert_eq!(data["valid_records"], 3);
    assert_eq!(data["invalid_records"], 1);
    assert_eq!(data["would_insert"], 1);
    assert_eq!(data["would_skip"], 2);
    assert_eq!(
        data["message"],
        "Excel validation successful. File structure is valid with 4 data rows and correct headers"
    );
    assert_eq!(app.store.len().await, 1);
}
