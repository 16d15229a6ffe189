//! Get job query
//!
//! Looks up one async upload job by its processing id.

use mediator::Request;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ingest::{JobRecord, JobTracker};

/// Query to get a job by ID
///
/// The id is kept as received; anything that is not a UUID cannot name a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetJobQuery {
    pub job_id: String,
}

/// Error type for get job query
#[derive(Debug, thiserror::Error)]
pub enum GetJobError {
    #[error("processing job {0} not found")]
    NotFound(String),
}

impl Request<Result<JobRecord, GetJobError>> for GetJobQuery {}

impl crate::cqrs::middleware::Query for GetJobQuery {}

#[tracing::instrument(skip(jobs))]
pub async fn handle(jobs: JobTracker, query: GetJobQuery) -> Result<JobRecord, GetJobError> {
    let id = Uuid::parse_str(query.job_id.trim())
        .map_err(|_| GetJobError::NotFound(query.job_id.clone()))?;

    jobs.poll(id).await.ok_or(GetJobError::NotFound(query.job_id))
}
