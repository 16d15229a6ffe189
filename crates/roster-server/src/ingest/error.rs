//! Ingestion error taxonomy
//!
//! Every variant here is fatal to the request that raised it. Invalid rows and
//! duplicate emails are not errors: they are counted in the
//! [`UploadSummary`](super::summary::UploadSummary).

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("file size {size} bytes exceeds maximum allowed size {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    #[error("invalid file format. Only .xlsx and .xls files are supported")]
    UnsupportedFormat { filename: String },

    #[error("failed to open Excel file: {0}")]
    MalformedInput(String),

    #[error("Excel file has no sheets")]
    NoSheet,

    #[error("Excel file appears to be empty or has no data rows")]
    EmptyInput,

    #[error("required headers not found: [{}]. Available headers: [{}]", .missing.join(", "), .observed.join(", "))]
    MissingRequiredHeaders {
        missing: Vec<String>,
        observed: Vec<String>,
    },

    #[error("Processed {processed} records, but failed to save to database: {source}")]
    Storage {
        processed: usize,
        #[source]
        source: StoreError,
    },

    #[error("ingestion task failed: {0}")]
    Task(String),

    #[error("server is shutting down; upload jobs are no longer accepted")]
    ShuttingDown,
}

impl IngestError {
    /// Whether the caller supplied an unacceptable file, as opposed to a server-side failure.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            IngestError::Storage { .. } | IngestError::Task(_) | IngestError::ShuttingDown
        )
    }

    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::FileTooLarge { .. } | IngestError::UnsupportedFormat { .. } => {
                "INPUT_REJECTED"
            },
            IngestError::MalformedInput(_) | IngestError::NoSheet | IngestError::EmptyInput => {
                "MALFORMED_INPUT"
            },
            IngestError::MissingRequiredHeaders { .. } => "SCHEMA_MISMATCH",
            IngestError::Storage { .. } => "STORAGE_FAILURE",
            IngestError::Task(_) => "INTERNAL_ERROR",
            IngestError::ShuttingDown => "SHUTTING_DOWN",
        }
    }
}
