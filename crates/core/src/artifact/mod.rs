//! Gated access to completed artifacts.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::job::{JobStatus, JobStore};

/// Why an artifact could not be served.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Job not found: {0}")]
    UnknownJob(String),

    /// The registry says Completed but the file is gone; a registry /
    /// filesystem inconsistency that must surface as an error rather than
    /// silently serving something else.
    #[error("STL file not found for job {0}")]
    FileMissing(String),

    /// The job has not produced an artifact (yet, or ever).
    #[error("Processing not completed for job {id}")]
    NotReady {
        id: String,
        status: JobStatus,
        progress: u8,
        error_detail: Option<String>,
    },
}

/// A resolved, on-disk artifact ready to stream.
#[derive(Debug, Clone)]
pub struct ArtifactHandle {
    pub path: PathBuf,
    /// Download name exposed to clients: `<job-id>.stl`.
    pub file_name: String,
}

/// Serves completed artifacts under guard conditions.
pub struct ArtifactGateway {
    store: Arc<dyn JobStore>,
}

impl ArtifactGateway {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Resolves a job id to its artifact, verifying the job is Completed
    /// and the file still exists on disk.
    pub async fn resolve(&self, id: &str) -> Result<ArtifactHandle, ArtifactError> {
        let record = self
            .store
            .get(id)
            .await
            .ok_or_else(|| ArtifactError::UnknownJob(id.to_string()))?;

        let path = match (&record.status, &record.artifact_path) {
            (JobStatus::Completed, Some(path)) => path.clone(),
            _ => {
                return Err(ArtifactError::NotReady {
                    id: id.to_string(),
                    status: record.status,
                    progress: record.progress,
                    error_detail: record.error_detail,
                })
            }
        };

        if tokio::fs::metadata(&path).await.is_err() {
            return Err(ArtifactError::FileMissing(id.to_string()));
        }

        Ok(ArtifactHandle {
            path,
            file_name: format!("{}.stl", id),
        })
    }
}
