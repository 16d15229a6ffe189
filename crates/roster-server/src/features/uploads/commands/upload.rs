//! Synchronous spreadsheet upload
//!
//! Runs the whole ingestion pipeline on the request task and answers with the
//! upload summary.

use axum::body::Bytes;
use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::ingest::{IngestError, IngestPipeline, UploadSummary, UploadedFile};

/// Command to ingest one spreadsheet
///
/// # Examples
///
/// ```rust,ignore
/// let command = UploadEmployeesCommand {
///     filename: "staff.xlsx".to_string(),
///     content: Bytes::from(workbook_bytes),
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadEmployeesCommand {
    pub filename: String,
    #[serde(skip)]
    pub content: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadEmployeesError {
    #[error("No file uploaded")]
    FileRequired,
    #[error("{0}")]
    Ingest(#[from] IngestError),
}

impl Request<Result<UploadSummary, UploadEmployeesError>> for UploadEmployeesCommand {}

impl crate::cqrs::middleware::Command for UploadEmployeesCommand {}

impl UploadEmployeesCommand {
    pub fn validate(&self) -> Result<(), UploadEmployeesError> {
        if self.filename.trim().is_empty() {
            return Err(UploadEmployeesError::FileRequired);
        }
        Ok(())
    }

    pub fn into_file(self) -> UploadedFile {
        UploadedFile::new(self.filename, self.content)
    }
}

#[tracing::instrument(skip(pipeline, command), fields(filename = %command.filename))]
pub async fn handle(
    pipeline: IngestPipeline,
    command: UploadEmployeesCommand,
) -> Result<UploadSummary, UploadEmployeesError> {
    command.validate()?;
    Ok(pipeline.process_upload(command.into_file()).await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::ingest::IngestSettings;
    use crate::store::MemoryEmployeeStore;
    use std::sync::Arc;

    fn pipeline() -> IngestPipeline {
        IngestPipeline::new(
            Arc::new(MemoryEmployeeStore::new()),
            Cache::disabled(),
            IngestSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_missing_filename_is_rejected() {
        let err = handle(
            pipeline(),
            UploadEmployeesCommand {
                filename: "  ".to_string(),
                content: Bytes::from_static(b"data"),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, UploadEmployeesError::FileRequired));
    }

    #[tokio::test]
    async fn test_wrong_extension_surfaces_ingest_error() {
        let err = handle(
            pipeline(),
            UploadEmployeesCommand {
                filename: "staff.csv".to_string(),
                content: Bytes::from_static(b"a,b,c"),
            },
        )
        .await
        .unwrap_err();

        match err {
            UploadEmployeesError::Ingest(e) => assert_eq!(e.code(), "INPUT_REJECTED"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
