pub mod validate_structure;

pub use validate_structure::{ValidateStructureError, ValidateStructureQuery};
