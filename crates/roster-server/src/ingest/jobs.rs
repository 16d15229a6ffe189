//! Async upload jobs
//!
//! [`JobTracker`] runs uploads in the background and keeps their status in memory for
//! the lifetime of the process. Jobs are spawned on a [`TaskTracker`] so shutdown can
//! wait for them, and a semaphore bounds how many run at once.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, Semaphore};
use tokio_util::task::TaskTracker;
use uuid::Uuid;

use super::error::IngestError;
use super::pipeline::{IngestPipeline, UploadedFile};
use super::summary::UploadSummary;

/// Upload job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Status of one async upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<UploadSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    fn pending(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Pending,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

type JobMap = Arc<RwLock<HashMap<Uuid, JobRecord>>>;

#[derive(Debug, Clone)]
pub struct JobTracker {
    jobs: JobMap,
    tasks: TaskTracker,
    workers: Arc<Semaphore>,
    pipeline: IngestPipeline,
}

impl JobTracker {
    pub fn new(pipeline: IngestPipeline, max_workers: usize) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tasks: TaskTracker::new(),
            workers: Arc::new(Semaphore::new(max_workers.max(1))),
            pipeline,
        }
    }

    /// Check the file, register a pending job and start it in the background.
    ///
    /// Returns as soon as the job is registered. Fails with
    /// [`IngestError::ShuttingDown`] once [`JobTracker::shutdown`] has begun.
    #[tracing::instrument(skip(self, file), fields(filename = %file.filename))]
    pub async fn submit(&self, file: UploadedFile) -> Result<Uuid, IngestError> {
        if self.tasks.is_closed() {
            return Err(IngestError::ShuttingDown);
        }
        self.pipeline.check_file(&file)?;

        let id = Uuid::new_v4();
        self.jobs.write().await.insert(id, JobRecord::pending(id));

        let jobs = self.jobs.clone();
        let workers = self.workers.clone();
        let pipeline = self.pipeline.clone();

        self.tasks.spawn(async move {
            let _permit = match workers.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    finish(&jobs, id, Err(e.to_string())).await;
                    return;
                },
            };

            transition(&jobs, id, JobStatus::Running).await;
            tracing::info!(job_id = %id, "Upload job started");

            let outcome = pipeline
                .process_upload(file)
                .await
                .map(|summary| summary.with_processing_id(id))
                .map_err(|e| e.to_string());
            finish(&jobs, id, outcome).await;
        });

        tracing::info!(job_id = %id, "Upload job submitted");
        Ok(id)
    }

    pub async fn poll(&self, id: Uuid) -> Option<JobRecord> {
        self.jobs.read().await.get(&id).cloned()
    }

    /// Number of jobs still running or waiting for a worker
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Close the tracker and wait for every in-flight job.
    pub async fn shutdown(&self) {
        self.tasks.close();
        tracing::info!(in_flight = self.tasks.len(), "Waiting for upload jobs to finish");
        self.tasks.wait().await;
    }
}

async fn transition(jobs: &JobMap, id: Uuid, status: JobStatus) {
    if let Some(job) = jobs.write().await.get_mut(&id) {
        job.status = status;
        job.updated_at = Utc::now();
    }
}

async fn finish(jobs: &JobMap, id: Uuid, outcome: Result<UploadSummary, String>) {
    let mut jobs = jobs.write().await;
    let Some(job) = jobs.get_mut(&id) else {
        return;
    };

    match outcome {
        Ok(summary) => {
            job.status = JobStatus::Completed;
            job.result = Some(summary);
        },
        Err(error) => {
            tracing::warn!(job_id = %id, error = %error, "Upload job failed");
            job.status = JobStatus::Failed;
            job.error = Some(error);
        },
    }
    job.updated_at = Utc::now();
}
