//! Create employee command
//!
//! - Command: the record attributes from the request body, validated before use
//! - Handler: standalone async function that persists the record and refreshes the cache

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::cache::Cache;
use crate::ingest::validator::{validate_record, FieldError};
use crate::models::{EmployeeResponse, NewEmployee};
use crate::store::{SharedStore, StoreError};

/// Command to create a new employee
///
/// # Examples
///
/// ```rust,ignore
/// let command = CreateEmployeeCommand {
///     employee: NewEmployee {
///         first_name: "Ann".to_string(),
///         last_name: "Lee".to_string(),
///         email: "ann@example.com".to_string(),
///         ..Default::default()
///     },
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmployeeCommand {
    #[serde(flatten)]
    pub employee: NewEmployee,
}

/// Errors that can occur when creating an employee
#[derive(Debug, thiserror::Error)]
pub enum CreateEmployeeError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("employee with email {0} already exists")]
    DuplicateEmail(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl Request<Result<EmployeeResponse, CreateEmployeeError>> for CreateEmployeeCommand {}

impl crate::cqrs::middleware::Command for CreateEmployeeCommand {}

impl CreateEmployeeCommand {
    /// Trim every attribute and check it against the record rules.
    pub fn validate(&self) -> Result<NewEmployee, CreateEmployeeError> {
        let record = self.employee.clone().trimmed();
        let violations = validate_record(&record);
        if !violations.is_empty() {
            return Err(CreateEmployeeError::Validation(
                violations.iter().map(FieldError::from).collect(),
            ));
        }
        Ok(record)
    }
}

#[tracing::instrument(skip(store, cache, command), fields(email = %command.employee.email))]
pub async fn handle(
    store: SharedStore,
    cache: Cache,
    command: CreateEmployeeCommand,
) -> Result<EmployeeResponse, CreateEmployeeError> {
    let record = command.validate()?;

    let employee = store.create_one(&record).await.map_err(|e| match e {
        StoreError::UniqueViolation { email } => CreateEmployeeError::DuplicateEmail(email),
        other => CreateEmployeeError::Store(other),
    })?;

    cache.put_employee(&employee).await;
    cache.invalidate_lists().await;

    tracing::info!(employee_id = employee.id, "Employee created");

    Ok(EmployeeResponse::from(employee))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::MemoryEmployeeStore;
    use std::sync::Arc;

    fn command(first: &str, email: &str) -> CreateEmployeeCommand {
        CreateEmployeeCommand {
            employee: NewEmployee {
                first_name: first.to_string(),
                last_name: "Lee".to_string(),
                email: email.to_string(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_validate_trims_and_reports_every_field() {
        let record = command("  Ann ", "ann@x.com").validate().unwrap();
        assert_eq!(record.first_name, "Ann");

        let err = command("A", "nope").validate().unwrap_err();
        match err {
            CreateEmployeeError::Validation(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["FirstName", "Email"]);
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_body_deserializes_flat() {
        let command: CreateEmployeeCommand = serde_json::from_str(
            r#"{"first_name": "Ann", "last_name": "Lee", "email": "ann@x.com", "city": "Leeds"}"#,
        )
        .unwrap();
        assert_eq!(command.employee.city, "Leeds");
        assert_eq!(command.employee.phone, "");
    }

    #[tokio::test]
    async fn test_handle_creates_and_rejects_duplicates() {
        let store: SharedStore = Arc::new(MemoryEmployeeStore::new());
        let cache = Cache::disabled();

        let created = handle(store.clone(), cache.clone(), command("Ann", "ann@x.com"))
            .await
            .unwrap();
        assert_eq!(created.full_name, "Ann Lee");

        let err = handle(store, cache, command("Annie", "ann@x.com")).await.unwrap_err();
        assert!(matches!(err, CreateEmployeeError::DuplicateEmail(ref e) if e == "ann@x.com"));
    }
}
