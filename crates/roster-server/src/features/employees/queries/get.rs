use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::cache::Cache;
use crate::models::EmployeeResponse;
use crate::store::{SharedStore, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetEmployeeQuery {
    pub id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum GetEmployeeError {
    #[error("employee with ID {0} not found")]
    NotFound(i64),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl Request<Result<EmployeeResponse, GetEmployeeError>> for GetEmployeeQuery {}

impl crate::cqrs::middleware::Query for GetEmployeeQuery {}

/// Cache first; a miss reads the store and fills the cache.
#[tracing::instrument(skip(store, cache))]
pub async fn handle(
    store: SharedStore,
    cache: Cache,
    query: GetEmployeeQuery,
) -> Result<EmployeeResponse, GetEmployeeError> {
    if let Some(employee) = cache.employee(query.id).await {
        return Ok(EmployeeResponse::from(employee));
    }

    let employee = store.find_by_id(query.id).await.map_err(|e| match e {
        StoreError::NotFound(id) => GetEmployeeError::NotFound(id),
        other => GetEmployeeError::Store(other),
    })?;

    cache.put_employee(&employee).await;

    Ok(EmployeeResponse::from(employee))
}
