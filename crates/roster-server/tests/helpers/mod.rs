//! Shared setup for router-level tests
//!
//! The application is built exactly as `main` builds it, except that storage and
//! cache are the in-memory implementations, so no database or Redis is needed.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use roster_server::{
    api,
    cache::{Cache, MemoryCache},
    config::Config,
    features::FeatureState,
    ingest::{IngestPipeline, JobTracker},
    store::MemoryEmployeeStore,
};
use rust_xlsxwriter::Workbook;
use serde_json::Value;
use tower::ServiceExt;

pub const BOUNDARY: &str = "roster-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryEmployeeStore>,
    pub cache: Cache,
    pub jobs: JobTracker,
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(Config::default())
}

pub fn setup_test_app_with(config: Config) -> TestApp {
    let store = Arc::new(MemoryEmployeeStore::new());
    let cache = Cache::new(Arc::new(MemoryCache::new()), Duration::from_secs(60));
    let pipeline = IngestPipeline::new(store.clone(), cache.clone(), config.ingest.settings());
    let jobs = JobTracker::new(pipeline.clone(), config.ingest.max_workers);

    let state = FeatureState {
        store: store.clone(),
        cache: cache.clone(),
        pipeline,
        jobs: jobs.clone(),
    };

    TestApp {
        router: api::create_router(state, &config),
        store,
        cache,
        jobs,
    }
}

impl TestApp {
    /// Send `request` and decode the JSON body.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(Method::DELETE)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn send_json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// POST `bytes` as the `file` field of a multipart form.
    pub async fn upload(&self, uri: &str, filename: &str, bytes: &[u8]) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body("file", filename, bytes)))
                .unwrap(),
        )
        .await
    }
}

/// Encode one file field as a `multipart/form-data` body.
pub fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(
        b"Content-Type: application/vnd.openxmlformats-officedocument.spreadsheetml.sheet\r\n\r\n",
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Build an `.xlsx` workbook with one sheet holding `rows` as strings.
pub fn workbook(rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            sheet.write_string(r as u32, c as u16, *cell).unwrap();
        }
    }
    workbook.save_to_buffer().unwrap()
}
