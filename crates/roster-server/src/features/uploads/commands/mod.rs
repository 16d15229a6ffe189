pub mod submit;
pub mod upload;

pub use submit::{SubmitUploadCommand, SubmitUploadError, SubmitUploadResponse};
pub use upload::{UploadEmployeesCommand, UploadEmployeesError};
