//! Spreadsheet upload routes
//!
//! All three endpoints take a `multipart/form-data` body whose `file` field holds an
//! `.xlsx` or `.xls` workbook.
//!
//! # Route Structure
//!
//! - `POST /api/employees/upload` - Ingest synchronously, answer with the summary
//! - `POST /api/employees/upload/async` - Start a background job, answer with its id
//! - `POST /api/employees/validate-excel` - Dry run, nothing is stored

use crate::api::response::{ApiResponse, ErrorResponse};
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use super::{
    commands::{
        SubmitUploadCommand, SubmitUploadError, UploadEmployeesCommand, UploadEmployeesError,
    },
    queries::{ValidateStructureError, ValidateStructureQuery},
    UploadState,
};
use crate::ingest::IngestError;

const FILE_FIELD: &str = "file";

// ============================================================================
// Router Configuration
// ============================================================================

pub fn uploads_routes() -> Router<UploadState> {
    Router::new()
        .route("/upload", post(upload_employees))
        .route("/upload/async", post(submit_upload))
        .route("/validate-excel", post(validate_excel))
}

/// Pull the `file` field out of the multipart body.
///
/// Other fields are ignored. A body without a `file` field yields an empty filename,
/// which the command rejects as "No file uploaded".
async fn read_file(mut multipart: Multipart) -> Result<(String, Bytes), UploadApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadApiError::Multipart(e.status(), e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| UploadApiError::Multipart(e.status(), e.body_text()))?;
        return Ok((filename, data));
    }

    Ok((String::new(), Bytes::new()))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Ingest a spreadsheet synchronously
///
/// # Endpoint
///
/// `POST /api/employees/upload`
///
/// # Response
///
/// - `200 OK` - Upload summary (inserted, skipped, invalid rows and row errors)
/// - `400 Bad Request` - No file, wrong format, too large, unreadable or missing headers
/// - `500 Internal Server Error` - Storage failure while saving
#[tracing::instrument(skip(state, multipart))]
async fn upload_employees(
    State(state): State<UploadState>,
    multipart: Multipart,
) -> Result<Response, UploadApiError> {
    let (filename, content) = read_file(multipart).await?;
    let command = UploadEmployeesCommand { filename, content };

    let summary = super::commands::upload::handle(state.pipeline, command).await?;

    tracing::info!(
        inserted = summary.inserted_records,
        skipped = summary.skipped_records,
        invalid = summary.invalid_records,
        "Upload processed via API"
    );

    Ok((StatusCode::OK, Json(ApiResponse::success(summary))).into_response())
}

/// Start a background upload job
///
/// # Endpoint
///
/// `POST /api/employees/upload/async`
///
/// # Response
///
/// - `202 Accepted` - Job registered; poll `GET /api/jobs/:processing_id`
/// - `400 Bad Request` - No file, wrong format or too large
#[tracing::instrument(skip(state, multipart))]
async fn submit_upload(
    State(state): State<UploadState>,
    multipart: Multipart,
) -> Result<Response, UploadApiError> {
    let (filename, content) = read_file(multipart).await?;
    let command = SubmitUploadCommand { filename, content };

    let response = super::commands::submit::handle(state.jobs, command).await?;

    tracing::info!(job_id = %response.processing_id, "Upload job submitted via API");

    Ok((StatusCode::ACCEPTED, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// Validate a spreadsheet without storing anything
///
/// # Endpoint
///
/// `POST /api/employees/validate-excel`
///
/// # Response
///
/// - `200 OK` - Row counts, row errors and the emails that would be skipped
/// - `400 Bad Request` - No file, wrong format, too large, unreadable or missing headers
#[tracing::instrument(skip(state, multipart))]
async fn validate_excel(
    State(state): State<UploadState>,
    multipart: Multipart,
) -> Result<Response, UploadApiError> {
    let (filename, content) = read_file(multipart).await?;
    let query = ValidateStructureQuery { filename, content };

    let preview = super::queries::validate_structure::handle(state.pipeline, query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(preview))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum UploadApiError {
    Multipart(StatusCode, String),
    FileRequired,
    Ingest(IngestError),
}

impl From<UploadEmployeesError> for UploadApiError {
    fn from(err: UploadEmployeesError) -> Self {
        match err {
            UploadEmployeesError::FileRequired => Self::FileRequired,
            UploadEmployeesError::Ingest(e) => Self::Ingest(e),
        }
    }
}

impl From<SubmitUploadError> for UploadApiError {
    fn from(err: SubmitUploadError) -> Self {
        match err {
            SubmitUploadError::FileRequired => Self::FileRequired,
            SubmitUploadError::Ingest(e) => Self::Ingest(e),
        }
    }
}

impl From<ValidateStructureError> for UploadApiError {
    fn from(err: ValidateStructureError) -> Self {
        match err {
            ValidateStructureError::FileRequired => Self::FileRequired,
            ValidateStructureError::Ingest(e) => Self::Ingest(e),
        }
    }
}

impl IntoResponse for UploadApiError {
    fn into_response(self) -> Response {
        match self {
            UploadApiError::Multipart(status, message) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", message);
                (status, Json(error)).into_response()
            },
            UploadApiError::FileRequired => {
                let error = ErrorResponse::new("VALIDATION_ERROR", "No file uploaded");
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            UploadApiError::Ingest(ref err) if err.is_client_error() => {
                let details = match err {
                    IngestError::MissingRequiredHeaders { missing, observed } => json!({
                        "reason": err.code(),
                        "missing": missing,
                        "observed": observed,
                    }),
                    _ => json!({ "reason": err.code() }),
                };
                let error = ErrorResponse::with_details("VALIDATION_ERROR", err.to_string(), details);
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            UploadApiError::Ingest(err @ IngestError::ShuttingDown) => {
                tracing::warn!("Rejected upload: {}", err);
                let error = ErrorResponse::with_details(
                    "SERVICE_UNAVAILABLE",
                    err.to_string(),
                    json!({ "reason": err.code() }),
                );
                (StatusCode::SERVICE_UNAVAILABLE, Json(error)).into_response()
            },
            UploadApiError::Ingest(err) => {
                tracing::error!("Ingestion failed: {}", err);
                let error = ErrorResponse::with_details(
                    "INTERNAL_ERROR",
                    err.to_string(),
                    json!({ "reason": err.code() }),
                );
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

impl std::fmt::Display for UploadApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Multipart(_, message) => write!(f, "{}", message),
            Self::FileRequired => write!(f, "No file uploaded"),
            Self::Ingest(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_error_display() {
        assert_eq!(UploadApiError::FileRequired.to_string(), "No file uploaded");
    }

    #[test]
    fn test_ingest_errors_split_by_blame() {
        let rejected = UploadApiError::Ingest(IngestError::UnsupportedFormat {
            filename: "a.csv".to_string(),
        });
        assert_eq!(rejected.into_response().status(), StatusCode::BAD_REQUEST);

        let storage = UploadApiError::Ingest(IngestError::Storage {
            processed: 3,
            source: StoreError::Backend("down".to_string()),
        });
        assert_eq!(
            storage.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
