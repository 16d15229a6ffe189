pub mod commands;
pub mod queries;
pub mod routes;

use crate::ingest::{IngestPipeline, JobTracker};

pub use commands::{
    SubmitUploadCommand, SubmitUploadError, SubmitUploadResponse, UploadEmployeesCommand,
    UploadEmployeesError,
};
pub use queries::{ValidateStructureError, ValidateStructureQuery};
pub use routes::uploads_routes;

/// State shared by the upload routes
#[derive(Debug, Clone)]
pub struct UploadState {
    pub pipeline: IngestPipeline,
    pub jobs: JobTracker,
}
