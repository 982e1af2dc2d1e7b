use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use super::types::{JobRecord, JobStatus};

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Job already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid status transition for job {id}: {from:?} -> {to:?}")]
    InvalidTransition {
        id: String,
        from: JobStatus,
        to: JobStatus,
    },
}

/// Registry of job records, keyed by job id.
///
/// Implementations must serialize mutations per job id so concurrent status
/// reads never observe a torn record, and must enforce the status machine:
/// terminal states are absorbing and progress never decreases while a job
/// is Processing.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Inserts a fresh record. Fails if the id is already present.
    async fn insert(&self, record: JobRecord) -> Result<(), StoreError>;

    /// Returns a snapshot of the record, if present.
    async fn get(&self, id: &str) -> Option<JobRecord>;

    /// Removes the record, returning it if it existed.
    async fn remove(&self, id: &str) -> Option<JobRecord>;

    /// Uploaded → Processing, establishing the initial progress baseline.
    async fn mark_processing(
        &self,
        id: &str,
        progress: u8,
        message: &str,
    ) -> Result<(), StoreError>;

    /// Applies a progress update while the job is Processing.
    ///
    /// Updates that would lower the progress value are silently dropped, as
    /// are updates for jobs not currently Processing.
    async fn update_progress(&self, id: &str, progress: u8, message: &str)
        -> Result<(), StoreError>;

    /// Replaces the phase message without touching status or progress.
    async fn set_message(&self, id: &str, message: &str) -> Result<(), StoreError>;

    /// Transitions to Completed with progress 100 and the artifact path set.
    async fn complete(&self, id: &str, artifact_path: PathBuf) -> Result<(), StoreError>;

    /// Transitions to Failed from any non-terminal state.
    async fn fail(&self, id: &str, error_detail: &str) -> Result<(), StoreError>;
}
