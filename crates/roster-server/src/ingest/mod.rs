//! Spreadsheet ingestion
//!
//! Turns an uploaded workbook into persisted employee records plus a summary of what
//! happened to every row. The stages, leaves first:
//!
//! - [`validator`]: per-field rules for a candidate record
//! - [`parser`]: workbook bytes to rows of trimmed text
//! - [`headers`]: header row to column indices, required columns enforced
//! - [`mapper`]: data rows to validated candidates and row-qualified errors
//! - [`dedup`] / [`persist`]: chunked inserts with duplicate-email classification
//! - [`pipeline`]: the orchestrator behind the upload endpoints
//! - [`jobs`]: background uploads with pollable status
//!
//! # Example
//!
//! ```rust,ignore
//! let pipeline = IngestPipeline::new(store, cache, IngestSettings::default());
//! let summary = pipeline
//!     .process_upload(UploadedFile::new("staff.xlsx", bytes))
//!     .await?;
//! println!("{}", summary.message);
//! ```

pub mod dedup;
pub mod error;
pub mod headers;
pub mod jobs;
pub mod mapper;
pub mod parser;
pub mod persist;
pub mod pipeline;
pub mod summary;
pub mod validator;

pub use error::IngestError;
pub use jobs::{JobRecord, JobStatus, JobTracker};
pub use pipeline::{IngestPipeline, IngestSettings, IngestStage, UploadedFile};
pub use summary::{StructurePreview, UploadSummary};
pub use validator::FieldError;
