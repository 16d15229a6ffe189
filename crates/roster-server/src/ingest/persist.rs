//! Chunked persistence of validated candidates

use super::dedup::DuplicateLog;
use crate::models::NewEmployee;
use crate::store::{EmployeeStore, StoreError};

/// Totals across every chunk that was attempted
#[derive(Debug, Default)]
pub struct PersistOutcome {
    pub inserted: usize,
    pub skipped: usize,
    pub duplicates: DuplicateLog,
    /// First non-duplicate failure; chunks after it were not attempted
    pub failure: Option<StoreError>,
}

/// Persist `records` in chunks of `batch_size`, one storage transaction per chunk.
///
/// Chunks committed before a failure stay committed.
#[tracing::instrument(skip(store, records), fields(records = records.len()))]
pub async fn persist_records(
    store: &dyn EmployeeStore,
    records: &[NewEmployee],
    batch_size: usize,
) -> PersistOutcome {
    let mut outcome = PersistOutcome::default();

    for (index, chunk) in records.chunks(batch_size.max(1)).enumerate() {
        match store.create_batch(chunk).await {
            Ok(report) => {
                tracing::debug!(
                    chunk = index,
                    inserted = report.inserted,
                    duplicates = report.duplicates.len(),
                    "Chunk persisted"
                );
                outcome.inserted += report.inserted;
                outcome.skipped += report.duplicates.len();
                outcome.duplicates.extend(&report.duplicates);
            },
            Err(e) => {
                tracing::error!(chunk = index, error = %e, "Chunk failed, stopping persistence");
                outcome.failure = Some(e);
                break;
            },
        }
    }

    if !outcome.duplicates.is_empty() {
        tracing::info!(
            unique = outcome.duplicates.unique_count(),
            examples = ?outcome.duplicates.examples(),
            "Duplicate emails encountered"
        );
    }

    outcome
}
