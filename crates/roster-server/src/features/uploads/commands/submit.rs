//! Asynchronous spreadsheet upload
//!
//! The file is checked for eligibility, registered as a pending job and processed
//! in the background. The caller polls `/api/jobs/:id` for the outcome.

use axum::body::Bytes;
use mediator::Request;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ingest::{IngestError, JobStatus, JobTracker, UploadedFile};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitUploadCommand {
    pub filename: String,
    #[serde(skip)]
    pub content: Bytes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitUploadResponse {
    pub processing_id: Uuid,
    pub status: JobStatus,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitUploadError {
    #[error("No file uploaded")]
    FileRequired,
    #[error("{0}")]
    Ingest(#[from] IngestError),
}

impl Request<Result<SubmitUploadResponse, SubmitUploadError>> for SubmitUploadCommand {}

impl crate::cqrs::middleware::Command for SubmitUploadCommand {}

impl SubmitUploadCommand {
    pub fn validate(&self) -> Result<(), SubmitUploadError> {
        if self.filename.trim().is_empty() {
            return Err(SubmitUploadError::FileRequired);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(jobs, command), fields(filename = %command.filename))]
pub async fn handle(
    jobs: JobTracker,
    command: SubmitUploadCommand,
) -> Result<SubmitUploadResponse, SubmitUploadError> {
    command.validate()?;

    let processing_id = jobs
        .submit(UploadedFile::new(command.filename, command.content))
        .await?;

    Ok(SubmitUploadResponse {
        processing_id,
        status: JobStatus::Pending,
        message: "File upload accepted and is being processed".to_string(),
    })
}
