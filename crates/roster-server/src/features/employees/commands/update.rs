//! Update employee command
//!
//! Partially updates an existing employee. Only the attributes present in the
//! body change; the merged record is validated as a whole before it is written.

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::cache::Cache;
use crate::ingest::validator::{validate_record, FieldError};
use crate::models::{EmployeePatch, EmployeeResponse, NewEmployee};
use crate::store::{SharedStore, StoreError};

/// Command to update an existing employee
///
/// The `id` comes from the path; the body carries the patch.
///
/// # Examples
///
/// ```rust,ignore
/// let command = UpdateEmployeeCommand {
///     id: 42,
///     patch: EmployeePatch {
///         city: Some("York".to_string()),
///         ..Default::default()
///     },
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEmployeeCommand {
    #[serde(skip)]
    pub id: i64,
    #[serde(flatten)]
    pub patch: EmployeePatch,
}

/// Errors that can occur when updating an employee
#[derive(Debug, thiserror::Error)]
pub enum UpdateEmployeeError {
    /// No attribute was provided
    #[error("At least one field must be provided for update")]
    NoFieldsToUpdate,
    #[error("employee with ID {0} not found")]
    NotFound(i64),
    /// The merged record breaks one or more field rules
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    #[error("employee with email {0} already exists")]
    DuplicateEmail(String),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl Request<Result<EmployeeResponse, UpdateEmployeeError>> for UpdateEmployeeCommand {}

impl crate::cqrs::middleware::Command for UpdateEmployeeCommand {}

impl UpdateEmployeeCommand {
    pub fn validate(&self) -> Result<(), UpdateEmployeeError> {
        if self.patch.is_empty() {
            return Err(UpdateEmployeeError::NoFieldsToUpdate);
        }
        Ok(())
    }

    /// Overlay the patch onto `current` and check the result.
    fn merge(&self, current: NewEmployee) -> Result<NewEmployee, UpdateEmployeeError> {
        let merged = self.patch.apply_to(current);
        let violations = validate_record(&merged);
        if violations.is_empty() {
            Ok(merged)
        } else {
            Err(UpdateEmployeeError::Validation(
                violations.iter().map(FieldError::from).collect(),
            ))
        }
    }
}

fn map_store_error(e: StoreError) -> UpdateEmployeeError {
    match e {
        StoreError::NotFound(id) => UpdateEmployeeError::NotFound(id),
        StoreError::UniqueViolation { email } => UpdateEmployeeError::DuplicateEmail(email),
        other => UpdateEmployeeError::Store(other),
    }
}

#[tracing::instrument(skip(store, cache, command), fields(employee_id = command.id))]
pub async fn handle(
    store: SharedStore,
    cache: Cache,
    command: UpdateEmployeeCommand,
) -> Result<EmployeeResponse, UpdateEmployeeError> {
    command.validate()?;

    let current = store.find_by_id(command.id).await.map_err(map_store_error)?;
    let record = command.merge(NewEmployee::from(&current))?;

    let employee = store
        .update(command.id, &record)
        .await
        .map_err(map_store_error)?;

    cache.put_employee(&employee).await;
    cache.invalidate_lists().await;

    tracing::info!("Employee updated");

    Ok(EmployeeResponse::from(employee))
}
