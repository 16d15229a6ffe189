//! Header mapping builder

use std::collections::HashMap;

use super::error::IngestError;
use crate::models::EmployeeField;

/// Normalized column name to zero-based column index, built from a header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    columns: HashMap<String, usize>,
}

impl HeaderMap {
    /// Map each header (trimmed, lower-cased) to its position and check that the
    /// required columns are present. A repeated name keeps its last position.
    pub fn build(header_row: &[String]) -> Result<Self, IngestError> {
        let mut columns = HashMap::with_capacity(header_row.len());
        for (index, header) in header_row.iter().enumerate() {
            columns.insert(normalize(header), index);
        }

        let missing: Vec<String> = EmployeeField::ALL
            .iter()
            .filter(|field| field.is_required() && !columns.contains_key(field.column()))
            .map(|field| field.column().to_string())
            .collect();

        if !missing.is_empty() {
            return Err(IngestError::MissingRequiredHeaders {
                missing,
                observed: header_row.to_vec(),
            });
        }

        Ok(Self { columns })
    }

    pub fn index_of(&self, field: EmployeeField) -> Option<usize> {
        self.columns.get(field.column()).copied()
    }

    /// Trimmed cell for `field`, or an empty string when the column is absent
    /// or the row is shorter than the column index.
    pub fn cell<'r>(&self, row: &'r [String], field: EmployeeField) -> &'r str {
        self.index_of(field)
            .and_then(|index| row.get(index))
            .map(|cell| cell.trim())
            .unwrap_or("")
    }
}

fn normalize(header: &str) -> String {
    header.trim().to_lowercase()
}
