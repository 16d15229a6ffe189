//! Duplicate-email bookkeeping
//!
//! [`DuplicateLog`] collects the emails rejected by the uniqueness constraint while
//! persisting. [`preview_duplicates`] is the read-only counterpart used by structure
//! validation: it classifies candidates against storage without writing anything.

use std::collections::HashSet;

use crate::models::NewEmployee;
use crate::store::{EmployeeStore, StoreError};

/// How many duplicate emails a summary lists
pub const MAX_DUPLICATE_EXAMPLES: usize = 10;

/// Unique duplicate emails in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateLog {
    emails: Vec<String>,
    seen: HashSet<String>,
}

impl DuplicateLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, email: &str) {
        if self.seen.insert(email.to_string()) {
            self.emails.push(email.to_string());
        }
    }

    pub fn extend<I, S>(&mut self, emails: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for email in emails {
            self.record(email.as_ref());
        }
    }

    /// Number of distinct emails recorded
    pub fn unique_count(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    /// At most [`MAX_DUPLICATE_EXAMPLES`] emails for display
    pub fn examples(&self) -> &[String] {
        &self.emails[..self.emails.len().min(MAX_DUPLICATE_EXAMPLES)]
    }

    /// Distinct emails beyond the displayed examples
    pub fn overflow(&self) -> usize {
        self.emails.len().saturating_sub(MAX_DUPLICATE_EXAMPLES)
    }

    /// Message fragment listing the examples, e.g. ` (a@x.com, b@x.com)`
    pub fn message_fragment(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let examples = self.examples().join(", ");
        match self.overflow() {
            0 => format!(" ({examples})"),
            more => format!(" (examples: {examples} and {more} more)"),
        }
    }
}

/// Read-only classification of candidates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicatePreview {
    pub would_insert: usize,
    pub would_skip: usize,
    pub duplicates: DuplicateLog,
}

/// Classify each candidate as new or duplicate, looking emails up in storage and
/// against candidates earlier in the same file.
#[tracing::instrument(skip_all, fields(candidates = records.len()))]
pub async fn preview_duplicates(
    store: &dyn EmployeeStore,
    records: &[NewEmployee],
) -> Result<DuplicatePreview, StoreError> {
    let mut preview = DuplicatePreview::default();
    let mut in_file: HashSet<&str> = HashSet::new();

    for record in records {
        let email = record.email.as_str();
        let duplicate =
            !in_file.insert(email) || store.find_by_email(email).await?.is_some();

        if duplicate {
            preview.would_skip += 1;
            preview.duplicates.record(email);
        } else {
            preview.would_insert += 1;
        }
    }

    Ok(preview)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::MemoryEmployeeStore;

    fn record(email: &str) -> NewEmployee {
        NewEmployee {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_log_keeps_unique_emails_in_order() {
        let mut log = DuplicateLog::new();
        log.extend(["b@x.com", "a@x.com", "b@x.com"]);

        assert_eq!(log.unique_count(), 2);
        assert_eq!(log.examples(), ["b@x.com", "a@x.com"]);
        assert_eq!(log.message_fragment(), " (b@x.com, a@x.com)");
    }

    #[test]
    fn test_log_caps_examples() {
        let mut log = DuplicateLog::new();
        log.extend((0..13).map(|i| format!("user{i}@x.com")));

        assert_eq!(log.examples().len(), MAX_DUPLICATE_EXAMPLES);
        assert_eq!(log.overflow(), 3);
        assert!(log.message_fragment().starts_with(" (examples: user0@x.com, "));
        assert!(log.message_fragment().ends_with("user9@x.com and 3 more)"));
    }

    #[test]
    fn test_empty_log_has_no_fragment() {
        assert_eq!(DuplicateLog::new().message_fragment(), "");
    }

    #[tokio::test]
    async fn test_preview_checks_storage_and_file() {
        let store = MemoryEmployeeStore::new();
        store.create_one(&record("taken@x.com")).await.unwrap();

        let preview = preview_duplicates(
            &store,
            &[
                record("new@x.com"),
                record("taken@x.com"),
                record("new@x.com"),
                record("other@x.com"),
            ],
        )
        .await
        .unwrap();

        assert_eq!(preview.would_insert, 2);
        assert_eq!(preview.would_skip, 2);
        assert_eq!(preview.duplicates.examples(), ["taken@x.com", "new@x.com"]);
        assert_eq!(store.len().await, 1);
    }
}
