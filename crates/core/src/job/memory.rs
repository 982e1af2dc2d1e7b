//! In-memory registry backend.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::store::{JobStore, StoreError};
use super::types::{JobRecord, JobStatus};

/// In-memory job registry, scoped to the process lifetime.
///
/// The outer lock protects the map structure (insert/remove); each record
/// carries its own lock so mutations on one job id are serialized against
/// each other without blocking unrelated jobs.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<String, Arc<RwLock<JobRecord>>>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, id: &str) -> Option<Arc<RwLock<JobRecord>>> {
        self.jobs.read().await.get(id).cloned()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert(&self, record: JobRecord) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&record.id) {
            return Err(StoreError::AlreadyExists(record.id));
        }
        jobs.insert(record.id.clone(), Arc::new(RwLock::new(record)));
        Ok(())
    }

    async fn get(&self, id: &str) -> Option<JobRecord> {
        let entry = self.entry(id).await?;
        let record = entry.read().await;
        Some(record.clone())
    }

    async fn remove(&self, id: &str) -> Option<JobRecord> {
        let entry = self.jobs.write().await.remove(id)?;
        let record = entry.read().await;
        Some(record.clone())
    }

    async fn mark_processing(
        &self,
        id: &str,
        progress: u8,
        message: &str,
    ) -> Result<(), StoreError> {
        let entry = self
            .entry(id)
            .await
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let mut record = entry.write().await;
        if record.status != JobStatus::Uploaded {
            return Err(StoreError::InvalidTransition {
                id: id.to_string(),
                from: record.status,
                to: JobStatus::Processing,
            });
        }
        record.status = JobStatus::Processing;
        record.progress = progress.min(100);
        record.message = message.to_string();
        Ok(())
    }

    async fn update_progress(
        &self,
        id: &str,
        progress: u8,
        message: &str,
    ) -> Result<(), StoreError> {
        let entry = self
            .entry(id)
            .await
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let mut record = entry.write().await;
        // Only a live job advances, and never backwards.
        if record.status != JobStatus::Processing || progress <= record.progress {
            return Ok(());
        }
        record.progress = progress.min(100);
        record.message = message.to_string();
        Ok(())
    }

    async fn set_message(&self, id: &str, message: &str) -> Result<(), StoreError> {
        let entry = self
            .entry(id)
            .await
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let mut record = entry.write().await;
        if !record.status.is_terminal() {
            record.message = message.to_string();
        }
        Ok(())
    }

    async fn complete(&self, id: &str, artifact_path: PathBuf) -> Result<(), StoreError> {
        let entry = self
            .entry(id)
            .await
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let mut record = entry.write().await;
        if record.status != JobStatus::Processing {
            return Err(StoreError::InvalidTransition {
                id: id.to_string(),
                from: record.status,
                to: JobStatus::Completed,
            });
        }
        record.status = JobStatus::Completed;
        record.progress = 100;
        record.message = "Processing completed successfully".to_string();
        record.artifact_path = Some(artifact_path);
        record.error_detail = None;
        Ok(())
    }

    async fn fail(&self, id: &str, error_detail: &str) -> Result<(), StoreError> {
        let entry = self
            .entry(id)
            .await
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let mut record = entry.write().await;
        if record.status.is_terminal() {
            return Err(StoreError::InvalidTransition {
                id: id.to_string(),
                from: record.status,
                to: JobStatus::Failed,
            });
        }
        record.status = JobStatus::Failed;
        record.message = "Processing failed".to_string();
        record.error_detail = Some(error_detail.to_string());
        record.artifact_path = None;
        Ok(())
    }
}
