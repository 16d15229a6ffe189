//! Employee storage
//!
//! [`EmployeeStore`] is the persistence seam used by the API features and the
//! ingestion pipeline. Two implementations ship with the crate:
//!
//! - [`PgEmployeeStore`]: PostgreSQL via sqlx, used by the server binary
//! - [`MemoryEmployeeStore`]: process-local, used by tests and local runs
//!
//! Both report [`StoreError::UniqueViolation`] for an email that already exists, which
//! is what duplicate classification during ingestion depends on.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Employee, NewEmployee};

pub use memory::MemoryEmployeeStore;
pub use postgres::PgEmployeeStore;

/// Shared handle to the configured store
pub type SharedStore = Arc<dyn EmployeeStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("employee with ID {0} not found")]
    NotFound(i64),

    #[error("employee with email {email} already exists")]
    UniqueViolation { email: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// One page of employees plus the total number of matches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePage {
    pub employees: Vec<Employee>,
    pub total: i64,
}

/// Result of persisting one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub inserted: usize,
    /// Emails rejected by the uniqueness constraint, in batch order
    pub duplicates: Vec<String>,
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn create_one(&self, record: &NewEmployee) -> Result<Employee, StoreError>;

    /// Persist `records` as one unit of work.
    ///
    /// Records whose email already exists (in storage or earlier in the batch) are
    /// skipped and reported in [`BatchReport::duplicates`]. Any other failure rolls the
    /// whole batch back and is returned.
    async fn create_batch(&self, records: &[NewEmployee]) -> Result<BatchReport, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Employee, StoreError>;

    /// Exact, case-sensitive match
    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, StoreError>;

    /// Employees ordered by id
    async fn find_all(&self, limit: i64, offset: i64) -> Result<EmployeePage, StoreError>;

    /// Case-insensitive substring match over first name, last name, email and company
    async fn search(&self, query: &str, limit: i64, offset: i64)
        -> Result<EmployeePage, StoreError>;

    async fn update(&self, id: i64, record: &NewEmployee) -> Result<Employee, StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
