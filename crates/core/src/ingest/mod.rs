//! Upload validation and job admission.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::job::{JobParams, JobRecord, JobStore, StoreError};
use crate::metrics;

/// The one file extension accepted at ingestion, matched case-insensitively.
pub const ACCEPTED_EXTENSION: &str = ".dcm";

/// Validation and admission errors. None of these leave a job record or
/// any files behind.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No files were uploaded")]
    EmptyBatch,

    #[error("Only .dcm files are allowed: {name}")]
    InvalidExtension { name: String },

    #[error("Too many files: {count} (limit {limit})")]
    TooManyFiles { count: usize, limit: usize },

    #[error("Anatomical structure and print material are required")]
    MissingParams,

    #[error("Failed to store uploaded files: {0}")]
    Io(#[from] std::io::Error),

    #[error("Registry error: {0}")]
    Store(#[from] StoreError),
}

/// One uploaded file, name and content.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// Validates a batch of uploads and admits it as a new job.
pub struct IngestionGate {
    uploads_dir: PathBuf,
    max_files: usize,
    store: Arc<dyn JobStore>,
}

impl IngestionGate {
    pub fn new(uploads_dir: PathBuf, max_files: usize, store: Arc<dyn JobStore>) -> Self {
        Self {
            uploads_dir,
            max_files,
            store,
        }
    }

    /// Admits a batch: validates it, persists the files under a fresh job
    /// namespace, inserts the record and returns the new job id.
    ///
    /// The record starts as Uploaded with progress 0; the caller is
    /// responsible for handing the id to the launcher.
    pub async fn admit(
        &self,
        files: Vec<UploadedFile>,
        params: JobParams,
    ) -> Result<String, IngestError> {
        if params.anatomical_structure.trim().is_empty()
            || params.print_material.trim().is_empty()
        {
            return Err(IngestError::MissingParams);
        }
        if files.is_empty() {
            return Err(IngestError::EmptyBatch);
        }
        if files.len() > self.max_files {
            return Err(IngestError::TooManyFiles {
                count: files.len(),
                limit: self.max_files,
            });
        }
        for file in &files {
            if !file.name.to_lowercase().ends_with(ACCEPTED_EXTENSION) {
                return Err(IngestError::InvalidExtension {
                    name: file.name.clone(),
                });
            }
        }

        let id = Uuid::new_v4().to_string();
        let job_dir = self.uploads_dir.join(&id);
        tokio::fs::create_dir_all(&job_dir).await?;

        for file in &files {
            // Keep the original name but strip any path components a
            // hostile client might smuggle in.
            let name = Path::new(&file.name)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| file.name.clone());
            tokio::fs::write(job_dir.join(name), &file.data).await?;
        }

        self.store.insert(JobRecord::new(id.clone(), params)).await?;
        metrics::JOBS_CREATED.inc();
        info!(job_id = %id, files = files.len(), "Job admitted");

        Ok(id)
    }
}
