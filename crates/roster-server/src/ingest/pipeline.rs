//! Batch ingestion orchestrator
//!
//! Drives one uploaded file through the stages
//! `validating-file -> parsing -> mapping-rows -> persisting -> summarizing -> done`.
//! Eligibility and parse failures are fatal and produce no summary. Invalid rows and
//! duplicate emails are accumulated, never fatal. A non-duplicate storage failure is
//! fatal but leaves earlier chunks committed.
//!
//! Structure validation stops after `mapping-rows` and swaps persistence for the
//! read-only duplicate preview.

use std::fmt;

use axum::body::Bytes;
use tracing::{debug, info, warn};

use super::dedup::preview_duplicates;
use super::error::IngestError;
use super::headers::HeaderMap;
use super::mapper::{map_rows, MappedRows};
use super::parser::parse_workbook;
use super::persist::persist_records;
use super::summary::{StructurePreview, UploadSummary};
use crate::cache::Cache;
use crate::store::SharedStore;

const ACCEPTED_EXTENSIONS: [&str; 2] = [".xlsx", ".xls"];

/// Pipeline stage, reported in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    ValidatingFile,
    Parsing,
    MappingRows,
    Persisting,
    Summarizing,
    Done,
    Failed,
}

impl IngestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestStage::ValidatingFile => "validating-file",
            IngestStage::Parsing => "parsing",
            IngestStage::MappingRows => "mapping-rows",
            IngestStage::Persisting => "persisting",
            IngestStage::Summarizing => "summarizing",
            IngestStage::Done => "done",
            IngestStage::Failed => "failed",
        }
    }
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded spreadsheet as received from the client
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSettings {
    pub max_file_size: u64,
    pub batch_size: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            batch_size: 100,
        }
    }
}

#[derive(Clone)]
pub struct IngestPipeline {
    store: SharedStore,
    cache: Cache,
    settings: IngestSettings,
}

impl fmt::Debug for IngestPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestPipeline")
            .field("cache", &self.cache)
            .field("settings", &self.settings)
            .finish()
    }
}

impl IngestPipeline {
    pub fn new(store: SharedStore, cache: Cache, settings: IngestSettings) -> Self {
        Self {
            store,
            cache,
            settings,
        }
    }

    pub fn settings(&self) -> IngestSettings {
        self.settings
    }

    /// File-eligibility check: size first, then extension (case-insensitive).
    pub fn check_file(&self, file: &UploadedFile) -> Result<(), IngestError> {
        if file.size() > self.settings.max_file_size {
            return Err(IngestError::FileTooLarge {
                size: file.size(),
                max: self.settings.max_file_size,
            });
        }

        let name = file.filename.to_lowercase();
        if !ACCEPTED_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            return Err(IngestError::UnsupportedFormat {
                filename: file.filename.clone(),
            });
        }

        Ok(())
    }

    /// Parse, map and persist an upload, returning its summary.
    #[tracing::instrument(skip(self, file), fields(filename = %file.filename, size = file.size()))]
    pub async fn process_upload(&self, file: UploadedFile) -> Result<UploadSummary, IngestError> {
        let mapped = self.read_rows(&file).await.inspect_err(fail)?;

        if mapped.records.is_empty() {
            debug!(stage = %IngestStage::Done, "No valid rows, nothing persisted");
            return Ok(UploadSummary::nothing_to_insert(mapped));
        }

        debug!(stage = %IngestStage::Persisting, candidates = mapped.records.len());
        let outcome =
            persist_records(self.store.as_ref(), &mapped.records, self.settings.batch_size).await;

        if outcome.inserted > 0 {
            self.cache.invalidate_lists().await;
        }

        if let Some(source) = outcome.failure {
            let err = IngestError::Storage {
                processed: mapped.total_records(),
                source,
            };
            fail(&err);
            return Err(err);
        }

        debug!(stage = %IngestStage::Summarizing);
        let summary = UploadSummary::from_outcome(mapped, &outcome);

        info!(
            stage = %IngestStage::Done,
            total = summary.total_records,
            inserted = summary.inserted_records,
            skipped = summary.skipped_records,
            invalid = summary.invalid_records,
            "Upload processed"
        );

        Ok(summary)
    }

    /// Run every check an upload would, without writing to storage.
    #[tracing::instrument(skip(self, file), fields(filename = %file.filename, size = file.size()))]
    pub async fn validate_structure(
        &self,
        file: UploadedFile,
    ) -> Result<StructurePreview, IngestError> {
        let mapped = self.read_rows(&file).await.inspect_err(fail)?;

        let preview = preview_duplicates(self.store.as_ref(), &mapped.records)
            .await
            .map_err(|source| IngestError::Storage {
                processed: mapped.total_records(),
                source,
            })
            .inspect_err(fail)?;

        info!(
            stage = %IngestStage::Done,
            total = mapped.total_records(),
            would_insert = preview.would_insert,
            would_skip = preview.would_skip,
            "Structure validated"
        );

        Ok(StructurePreview::new(mapped, &preview))
    }

    /// Eligibility check, then parse and map on the blocking pool.
    async fn read_rows(&self, file: &UploadedFile) -> Result<MappedRows, IngestError> {
        debug!(stage = %IngestStage::ValidatingFile);
        self.check_file(file)?;

        let bytes = file.bytes.clone();
        tokio::task::spawn_blocking(move || {
            debug!(stage = %IngestStage::Parsing);
            let sheet = parse_workbook(&bytes)?;

            debug!(stage = %IngestStage::MappingRows);
            let headers = HeaderMap::build(sheet.header())?;
            Ok::<_, IngestError>(map_rows(&sheet, &headers))
        })
        .await
        .map_err(|e| IngestError::Task(e.to_string()))?
    }
}

fn fail(err: &IngestError) {
    warn!(stage = %IngestStage::Failed, code = err.code(), error = %err, "Ingestion failed");
}
