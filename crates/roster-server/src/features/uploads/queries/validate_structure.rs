use axum::body::Bytes;
use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::ingest::{IngestError, IngestPipeline, StructurePreview, UploadedFile};

/// Dry run of an upload: every check, no writes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateStructureQuery {
    pub filename: String,
    #[serde(skip)]
    pub content: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum ValidateStructureError {
    #[error("No file uploaded")]
    FileRequired,
    #[error("{0}")]
    Ingest(#[from] IngestError),
}

impl Request<Result<StructurePreview, ValidateStructureError>> for ValidateStructureQuery {}

impl crate::cqrs::middleware::Query for ValidateStructureQuery {}

impl ValidateStructureQuery {
    pub fn validate(&self) -> Result<(), ValidateStructureError> {
        if self.filename.trim().is_empty() {
            return Err(ValidateStructureError::FileRequired);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pipeline, query), fields(filename = %query.filename))]
pub async fn handle(
    pipeline: IngestPipeline,
    query: ValidateStructureQuery,
) -> Result<StructurePreview, ValidateStructureError> {
    query.validate()?;
    Ok(pipeline
        .validate_structure(UploadedFile::new(query.filename, query.content))
        .await?)
}
