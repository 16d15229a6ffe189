use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::cache::Cache;
use crate::models::EmployeeResponse;
use crate::store::{SharedStore, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteEmployeeCommand {
    pub id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteEmployeeError {
    #[error("employee with ID {0} not found")]
    NotFound(i64),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl Request<Result<EmployeeResponse, DeleteEmployeeError>> for DeleteEmployeeCommand {}

impl crate::cqrs::middleware::Command for DeleteEmployeeCommand {}

fn map_store_error(e: StoreError) -> DeleteEmployeeError {
    match e {
        StoreError::NotFound(id) => DeleteEmployeeError::NotFound(id),
        other => DeleteEmployeeError::Store(other),
    }
}

/// Removes the employee and returns the record as it was before deletion.
#[tracing::instrument(skip(store, cache))]
pub async fn handle(
    store: SharedStore,
    cache: Cache,
    command: DeleteEmployeeCommand,
) -> Result<EmployeeResponse, DeleteEmployeeError> {
    let employee = store.find_by_id(command.id).await.map_err(map_store_error)?;

    store.delete(command.id).await.map_err(map_store_error)?;

    cache.forget_employee(command.id).await;
    cache.invalidate_lists().await;

    tracing::info!(email = %employee.email, "Employee deleted");

    Ok(EmployeeResponse::from(employee))
}
