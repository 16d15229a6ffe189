//! Jobs feature module
//!
//! Polling access to background upload jobs. Jobs live in the process-wide
//! [`JobTracker`](crate::ingest::JobTracker) and are lost on restart.

pub mod queries;
pub mod routes;

pub use queries::{GetJobError, GetJobQuery};
pub use routes::jobs_routes;
