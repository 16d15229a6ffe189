//! Feature modules implementing the roster API
//!
//! Each feature is a vertical slice following the CQRS (Command Query Responsibility
//! Segregation) pattern, with its own commands, queries and routes.
//!
//! # Features
//!
//! - **employees**: CRUD, pagination and search over employee records
//! - **uploads**: Spreadsheet ingestion, synchronous, asynchronous and dry run
//! - **jobs**: Status of asynchronous uploads
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `commands/` - Write operations
//! - `queries/` - Read operations
//! - `routes.rs` - HTTP route definitions and error mapping
//!
//! Commands and queries implement the mediator pattern using the `mediator` crate.

pub mod employees;
pub mod jobs;
pub mod shared;
pub mod uploads;

use axum::{extract::DefaultBodyLimit, Router};

use crate::cache::Cache;
use crate::ingest::{IngestPipeline, JobTracker};
use crate::store::SharedStore;

use employees::EmployeeState;
use uploads::UploadState;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Employee persistence
    pub store: SharedStore,
    /// Read-through cache in front of `store`
    pub cache: Cache,
    /// Spreadsheet ingestion over the same store and cache
    pub pipeline: IngestPipeline,
    /// Background upload jobs
    pub jobs: JobTracker,
}

impl FeatureState {
    fn employees(&self) -> EmployeeState {
        EmployeeState {
            store: self.store.clone(),
            cache: self.cache.clone(),
        }
    }

    fn uploads(&self) -> UploadState {
        UploadState {
            pipeline: self.pipeline.clone(),
            jobs: self.jobs.clone(),
        }
    }
}

/// Creates the feature router with every route mounted
///
/// - `/employees` - Record CRUD plus the upload endpoints
/// - `/jobs` - Async upload status
///
/// Upload routes accept bodies up to `body_limit` bytes; the rest keep axum's default.
pub fn router(state: FeatureState, body_limit: usize) -> Router<()> {
    let employees = employees::employees_routes()
        .with_state(state.employees())
        .merge(
            uploads::uploads_routes()
                .with_state(state.uploads())
                .layer(DefaultBodyLimit::max(body_limit)),
        );

    Router::new()
        .nest("/employees", employees)
        .nest("/jobs", jobs::jobs_routes().with_state(state.jobs.clone()))
}
