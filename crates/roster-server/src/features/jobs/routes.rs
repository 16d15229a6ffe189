//! Job routes
//!
//! Read-only status of async upload jobs started by `POST /api/employees/upload/async`.

use crate::api::response::{ApiResponse, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::queries::{get_job::handle as handle_get_job, GetJobError, GetJobQuery};
use crate::ingest::JobTracker;

/// Create job routes
pub fn jobs_routes() -> Router<JobTracker> {
    Router::new().route("/:job_id", get(get_job))
}

/// Get an upload job by its processing id
///
/// GET /api/jobs/:job_id
///
/// # Response
///
/// - `200 OK` - Job status; `result` once completed, `error` once failed
/// - `404 Not Found` - No such job
async fn get_job(
    State(jobs): State<JobTracker>,
    Path(job_id): Path<String>,
) -> Result<Response, JobApiError> {
    let job = handle_get_job(jobs, GetJobQuery { job_id }).await?;

    tracing::debug!(job_id = %job.id, status = job.status.as_str(), "Job polled via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(job))).into_response())
}

#[derive(Debug)]
struct JobApiError(GetJobError);

impl From<GetJobError> for JobApiError {
    fn from(err: GetJobError) -> Self {
        Self(err)
    }
}

impl IntoResponse for JobApiError {
    fn into_response(self) -> Response {
        match self.0 {
            GetJobError::NotFound(_) => {
                let error = ErrorResponse::new("NOT_FOUND", self.0.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
        }
    }
}
