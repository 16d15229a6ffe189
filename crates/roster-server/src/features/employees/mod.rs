pub mod commands;
pub mod queries;
pub mod routes;

use crate::cache::Cache;
use crate::store::SharedStore;

pub use commands::{
    CreateEmployeeCommand, CreateEmployeeError, DeleteEmployeeCommand, DeleteEmployeeError,
    UpdateEmployeeCommand, UpdateEmployeeError,
};

pub use queries::{
    GetEmployeeError, GetEmployeeQuery, ListEmployeesError, ListEmployeesQuery,
    ListEmployeesResponse, PaginationMetadata,
};

pub use routes::employees_routes;

/// State shared by the employee record routes
#[derive(Clone)]
pub struct EmployeeState {
    pub store: SharedStore,
    pub cache: Cache,
}
