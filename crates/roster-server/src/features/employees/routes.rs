//! Employee API routes
//!
//! # Route Structure
//!
//! - `POST /api/employees` - Create an employee
//! - `GET /api/employees` - List employees with pagination and optional search
//! - `GET /api/employees/:id` - Get a single employee
//! - `PUT /api/employees/:id` - Partially update an employee
//! - `DELETE /api/employees/:id` - Delete an employee
//!
//! # Examples
//!
//! ```rust,ignore
//! use axum::Router;
//! use roster_server::features::employees::{employees_routes, EmployeeState};
//!
//! let app = Router::new()
//!     .nest("/api/employees", employees_routes())
//!     .with_state(EmployeeState { store, cache });
//! ```

use crate::api::response::{ApiResponse, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::{
    commands::{
        CreateEmployeeCommand, CreateEmployeeError, DeleteEmployeeCommand, DeleteEmployeeError,
        UpdateEmployeeCommand, UpdateEmployeeError,
    },
    queries::{
        GetEmployeeError, GetEmployeeQuery, ListEmployeesError, ListEmployeesQuery,
    },
    EmployeeState,
};
use crate::ingest::validator::FieldError;

// ============================================================================
// Router Configuration
// ============================================================================

/// Creates the employees router with all record routes configured
pub fn employees_routes() -> Router<EmployeeState> {
    Router::new()
        .route("/", post(create_employee).get(list_employees))
        .route(
            "/:id",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Create a new employee
///
/// # Endpoint
///
/// `POST /api/employees`
///
/// # Request Body
///
/// ```json
/// {
///   "first_name": "Ann",
///   "last_name": "Lee",
///   "email": "ann@example.com",
///   "city": "Leeds"
/// }
/// ```
///
/// # Response
///
/// - `201 Created` - Employee created
/// - `400 Bad Request` - Validation error, one entry per broken field in `details`
/// - `409 Conflict` - Email already in use
/// - `500 Internal Server Error` - Storage error
#[tracing::instrument(skip(state, command), fields(email = %command.employee.email))]
async fn create_employee(
    State(state): State<EmployeeState>,
    Json(command): Json<CreateEmployeeCommand>,
) -> Result<Response, EmployeeApiError> {
    let response = super::commands::create::handle(state.store, state.cache, command).await?;

    tracing::info!(employee_id = response.employee.id, "Employee created via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

/// Update an existing employee
///
/// # Endpoint
///
/// `PUT /api/employees/:id`
///
/// Only the attributes present in the body change. An empty string clears an
/// optional attribute.
///
/// # Response
///
/// - `200 OK` - Employee updated
/// - `400 Bad Request` - Empty body or validation error
/// - `404 Not Found` - No employee with that id
/// - `409 Conflict` - Email already in use by another employee
/// - `500 Internal Server Error` - Storage error
#[tracing::instrument(skip(state, command))]
async fn update_employee(
    State(state): State<EmployeeState>,
    Path(id): Path<i64>,
    Json(mut command): Json<UpdateEmployeeCommand>,
) -> Result<Response, EmployeeApiError> {
    command.id = id;

    let response = super::commands::update::handle(state.store, state.cache, command).await?;

    tracing::info!(employee_id = id, "Employee updated via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

/// Delete an employee
///
/// # Endpoint
///
/// `DELETE /api/employees/:id`
///
/// # Response
///
/// - `200 OK` - Employee deleted, the removed record is returned
/// - `404 Not Found` - No employee with that id
/// - `500 Internal Server Error` - Storage error
#[tracing::instrument(skip(state))]
async fn delete_employee(
    State(state): State<EmployeeState>,
    Path(id): Path<i64>,
) -> Result<Response, EmployeeApiError> {
    let response =
        super::commands::delete::handle(state.store, state.cache, DeleteEmployeeCommand { id })
            .await?;

    tracing::info!(employee_id = id, "Employee deleted via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// Get a single employee
///
/// # Endpoint
///
/// `GET /api/employees/:id`
///
/// # Response
///
/// - `200 OK` - Employee found
/// - `404 Not Found` - No employee with that id
/// - `500 Internal Server Error` - Storage error
#[tracing::instrument(skip(state))]
async fn get_employee(
    State(state): State<EmployeeState>,
    Path(id): Path<i64>,
) -> Result<Response, EmployeeApiError> {
    let response =
        super::queries::get::handle(state.store, state.cache, GetEmployeeQuery { id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

/// List employees with pagination and optional search
///
/// # Endpoint
///
/// `GET /api/employees?page=1&limit=20&search=acme`
///
/// # Query Parameters
///
/// - `page` - Page number (default: 1)
/// - `limit` - Items per page (default: 20, max: 100)
/// - `search` - Case-insensitive match on name, email or company
///
/// # Response
///
/// - `200 OK` - Employees with pagination metadata
/// - `500 Internal Server Error` - Storage error
#[tracing::instrument(
    skip(state, query),
    fields(page = ?query.page, limit = ?query.limit, search = ?query.search)
)]
async fn list_employees(
    State(state): State<EmployeeState>,
    Query(query): Query<ListEmployeesQuery>,
) -> Result<Response, EmployeeApiError> {
    let response = super::queries::list::handle(state.store, state.cache, query).await?;

    tracing::debug!(
        count = response.items.len(),
        total = response.pagination.total,
        "Employees listed via API"
    );

    let meta = json!({
        "pagination": response.pagination
    });

    Ok(
        (StatusCode::OK, Json(ApiResponse::success_with_meta(response.items, meta)))
            .into_response(),
    )
}

// ============================================================================
// Error Handling
// ============================================================================

/// Unified error type for employee API endpoints
#[derive(Debug)]
enum EmployeeApiError {
    CreateError(CreateEmployeeError),
    UpdateError(UpdateEmployeeError),
    DeleteError(DeleteEmployeeError),
    GetError(GetEmployeeError),
    ListError(ListEmployeesError),
}

impl From<CreateEmployeeError> for EmployeeApiError {
    fn from(err: CreateEmployeeError) -> Self {
        Self::CreateError(err)
    }
}

impl From<UpdateEmployeeError> for EmployeeApiError {
    fn from(err: UpdateEmployeeError) -> Self {
        Self::UpdateError(err)
    }
}

impl From<DeleteEmployeeError> for EmployeeApiError {
    fn from(err: DeleteEmployeeError) -> Self {
        Self::DeleteError(err)
    }
}

impl From<GetEmployeeError> for EmployeeApiError {
    fn from(err: GetEmployeeError) -> Self {
        Self::GetError(err)
    }
}

impl From<ListEmployeesError> for EmployeeApiError {
    fn from(err: ListEmployeesError) -> Self {
        Self::ListError(err)
    }
}

fn validation_failed(errors: &[FieldError]) -> Response {
    let error = ErrorResponse::with_details("VALIDATION_ERROR", "Validation failed", json!(errors));
    (StatusCode::BAD_REQUEST, Json(error)).into_response()
}

fn not_found(id: i64) -> Response {
    let error = ErrorResponse::new("NOT_FOUND", format!("employee with ID {} not found", id));
    (StatusCode::NOT_FOUND, Json(error)).into_response()
}

fn conflict(email: &str) -> Response {
    let error = ErrorResponse::new(
        "CONFLICT",
        format!("employee with email {} already exists", email),
    );
    (StatusCode::CONFLICT, Json(error)).into_response()
}

fn internal(context: &str, err: &EmployeeApiError) -> Response {
    tracing::error!("Storage error during {}: {}", context, err);
    let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
}

impl IntoResponse for EmployeeApiError {
    fn into_response(self) -> Response {
        match &self {
            // Create errors
            EmployeeApiError::CreateError(CreateEmployeeError::Validation(errors)) => {
                validation_failed(errors)
            },
            EmployeeApiError::CreateError(CreateEmployeeError::DuplicateEmail(email)) => {
                conflict(email)
            },
            EmployeeApiError::CreateError(CreateEmployeeError::Store(_)) => {
                internal("employee creation", &self)
            },

            // Update errors
            EmployeeApiError::UpdateError(UpdateEmployeeError::NoFieldsToUpdate) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            EmployeeApiError::UpdateError(UpdateEmployeeError::Validation(errors)) => {
                validation_failed(errors)
            },
            EmployeeApiError::UpdateError(UpdateEmployeeError::NotFound(id)) => not_found(*id),
            EmployeeApiError::UpdateError(UpdateEmployeeError::DuplicateEmail(email)) => {
                conflict(email)
            },
            EmployeeApiError::UpdateError(UpdateEmployeeError::Store(_)) => {
                internal("employee update", &self)
            },

            // Delete errors
            EmployeeApiError::DeleteError(DeleteEmployeeError::NotFound(id)) => not_found(*id),
            EmployeeApiError::DeleteError(DeleteEmployeeError::Store(_)) => {
                internal("employee deletion", &self)
            },

            // Get errors
            EmployeeApiError::GetError(GetEmployeeError::NotFound(id)) => not_found(*id),
            EmployeeApiError::GetError(GetEmployeeError::Store(_)) => {
                internal("employee retrieval", &self)
            },

            // List errors
            EmployeeApiError::ListError(ListEmployeesError::Store(_)) => {
                internal("employee listing", &self)
            },
        }
    }
}

impl std::fmt::Display for EmployeeApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateError(e) => write!(f, "{}", e),
            Self::UpdateError(e) => write!(f, "{}", e),
            Self::DeleteError(e) => write!(f, "{}", e),
            Self::GetError(e) => write!(f, "{}", e),
            Self::ListError(e) => write!(f, "{}", e),
        }
    }
}
