pub mod get;
pub mod list;

pub use get::{GetEmployeeError, GetEmployeeQuery};
pub use list::{ListEmployeesError, ListEmployeesQuery, ListEmployeesResponse};
pub use crate::features::shared::pagination::PaginationMetadata;
