//! Row-to-record mapper
//!
//! Turns data rows into candidate records through a [`HeaderMap`] and validates
//! each one. A row is either fully accepted or fully rejected; rejected rows yield
//! one positional error per violation, e.g. `Row 7 - Email`.
//!
//! Invalid-record accounting counts violations, not rows: a rejected row with three
//! violations adds three to both the invalid and the total count.

use super::headers::HeaderMap;
use super::parser::Sheet;
use super::validator::{validate_record, FieldError, Violation};
use crate::models::{EmployeeField, NewEmployee};

/// Outcome of mapping every data row of a sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedRows {
    /// Candidates that passed validation, in sheet order
    pub records: Vec<NewEmployee>,
    /// One entry per violation across all rejected rows
    pub errors: Vec<FieldError>,
    /// Number of rejected rows
    pub rejected_rows: usize,
}

impl MappedRows {
    pub fn valid_records(&self) -> usize {
        self.records.len()
    }

    /// One per violation
    pub fn invalid_records(&self) -> usize {
        self.errors.len()
    }

    pub fn total_records(&self) -> usize {
        self.valid_records() + self.invalid_records()
    }
}

/// Map and validate every data row of `sheet`. Blank rows are skipped and not counted.
#[tracing::instrument(skip_all, fields(rows = sheet.row_count()))]
pub fn map_rows(sheet: &Sheet, headers: &HeaderMap) -> MappedRows {
    let mut mapped = MappedRows::default();

    for (row_number, row) in sheet.data_rows() {
        if is_blank(row) {
            continue;
        }

        let record = record_from_row(row, headers);
        let violations = validate_record(&record);

        if violations.is_empty() {
            mapped.records.push(record);
        } else {
            mapped.rejected_rows += 1;
            mapped
                .errors
                .extend(violations.iter().map(|v| row_error(row_number, v)));
        }
    }

    tracing::debug!(
        valid = mapped.valid_records(),
        rejected_rows = mapped.rejected_rows,
        errors = mapped.errors.len(),
        "Mapped data rows"
    );

    mapped
}

/// Whether every cell of `row` is empty after trimming
pub fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

fn record_from_row(row: &[String], headers: &HeaderMap) -> NewEmployee {
    let mut record = NewEmployee::default();
    for field in EmployeeField::ALL {
        record.set(field, headers.cell(row, field).to_string());
    }
    record
}

fn row_error(row_number: usize, violation: &Violation) -> FieldError {
    FieldError {
        field: format!("Row {} - {}", row_number, violation.field().label()),
        message: violation.to_string(),
    }
}
