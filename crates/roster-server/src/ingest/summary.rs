//! Ingestion results returned to callers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dedup::{DuplicateLog, DuplicatePreview};
use super::mapper::MappedRows;
use super::persist::PersistOutcome;
use super::validator::FieldError;

pub const NO_VALID_RECORDS: &str = "No valid employee records found in the Excel file";

/// Counts and message for a processed upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub message: String,
    pub total_records: usize,
    pub valid_records: usize,
    pub invalid_records: usize,
    pub inserted_records: usize,
    pub skipped_records: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub duplicate_emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_id: Option<Uuid>,
}

impl UploadSummary {
    /// Summary for a sheet with no valid rows; nothing was persisted.
    pub fn nothing_to_insert(mapped: MappedRows) -> Self {
        Self {
            message: NO_VALID_RECORDS.to_string(),
            total_records: mapped.total_records(),
            valid_records: 0,
            invalid_records: mapped.invalid_records(),
            inserted_records: 0,
            skipped_records: 0,
            duplicate_emails: Vec::new(),
            errors: mapped.errors,
            processing_id: None,
        }
    }

    pub fn from_outcome(mapped: MappedRows, outcome: &PersistOutcome) -> Self {
        let total = mapped.total_records();
        let invalid = mapped.invalid_records();
        Self {
            message: upload_message(
                total,
                outcome.inserted,
                outcome.skipped,
                &outcome.duplicates,
                invalid,
            ),
            total_records: total,
            valid_records: mapped.valid_records(),
            invalid_records: invalid,
            inserted_records: outcome.inserted,
            skipped_records: outcome.skipped,
            duplicate_emails: outcome.duplicates.examples().to_vec(),
            errors: mapped.errors,
            processing_id: None,
        }
    }

    pub fn with_processing_id(mut self, id: Uuid) -> Self {
        self.processing_id = Some(id);
        self
    }
}

fn upload_message(
    total: usize,
    inserted: usize,
    skipped: usize,
    duplicates: &DuplicateLog,
    invalid: usize,
) -> String {
    if skipped > 0 {
        format!(
            "Successfully processed {total} records. Inserted: {inserted} new employees, \
             Skipped: {skipped} duplicates{}, Invalid: {invalid}",
            duplicates.message_fragment()
        )
    } else {
        format!(
            "Successfully processed {total} records. Inserted: {inserted} new employees, \
             Invalid: {invalid}"
        )
    }
}

/// What an upload would do, computed without writing to storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructurePreview {
    pub message: String,
    pub total_records: usize,
    pub valid_records: usize,
    pub invalid_records: usize,
    pub would_insert: usize,
    pub would_skip: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub duplicate_emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl StructurePreview {
    pub fn new(mapped: MappedRows, preview: &DuplicatePreview) -> Self {
        let total = mapped.total_records();
        Self {
            message: format!(
                "Excel validation successful. File structure is valid with {total} data rows \
                 and correct headers"
            ),
            total_records: total,
            valid_records: mapped.valid_records(),
            invalid_records: mapped.invalid_records(),
            would_insert: preview.would_insert,
            would_skip: preview.would_skip,
            duplicate_emails: preview.duplicates.examples().to_vec(),
            errors: mapped.errors,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::NewEmployee;

    fn mapped(valid: usize, invalid: usize) -> MappedRows {
        MappedRows {
            records: vec![NewEmployee::default(); valid],
            errors: (0..invalid)
                .map(|i| FieldError {
                    field: format!("Row {} - Email", i + 2),
                    message: "Invalid email format".to_string(),
                })
                .collect(),
            rejected_rows: invalid,
        }
    }

    #[test]
    fn test_message_without_skips() {
        let outcome = PersistOutcome {
            inserted: 3,
            ..Default::default()
        };
        let summary = UploadSummary::from_outcome(mapped(3, 1), &outcome);

        assert_eq!(
            summary.message,
            "Successfully processed 4 records. Inserted: 3 new employees, Invalid: 1"
        );
        assert_eq!(summary.total_records, 4);
        assert_eq!(summary.valid_records, 3);
    }

    #[test]
    fn test_message_with_skips() {
        let mut duplicates = DuplicateLog::new();
        duplicates.extend(["a@x.com", "b@x.com"]);
        let outcome = PersistOutcome {
            inserted: 1,
            skipped: 2,
            duplicates,
            failure: None,
        };
        let summary = UploadSummary::from_outcome(mapped(3, 0), &outcome);

        assert_eq!(
            summary.message,
            "Successfully processed 3 records. Inserted: 1 new employees, \
             Skipped: 2 duplicates (a@x.com, b@x.com), Invalid: 0"
        );
        assert_eq!(summary.duplicate_emails, vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn test_empty_lists_are_omitted_from_json() {
        let outcome = PersistOutcome {
            inserted: 2,
            ..Default::default()
        };
        let json = serde_json::to_value(UploadSummary::from_outcome(mapped(2, 0), &outcome)).unwrap();

        assert!(json.get("duplicate_emails").is_none());
        assert!(json.get("errors").is_none());
        assert!(json.get("processing_id").is_none());
        assert_eq!(json["inserted_records"], 2);
    }

    #[test]
    fn test_nothing_to_insert() {
        let summary = UploadSummary::nothing_to_insert(mapped(0, 2));
        assert_eq!(summary.message, NO_VALID_RECORDS);
        assert_eq!(summary.total_records, 2);
        assert_eq!(summary.errors.len(), 2);
    }

    #[test]
    fn test_preview_message() {
        let preview = StructurePreview::new(mapped(5, 0), &DuplicatePreview::default());
        assert_eq!(
            preview.message,
            "Excel validation successful. File structure is valid with 5 data rows and correct headers"
        );
    }
}
