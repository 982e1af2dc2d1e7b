//! Reclamation of a job's filesystem and registry resources.

use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::job::JobStore;

/// What a cleanup invocation actually removed. Steps are independent and
/// best-effort; a step that finds nothing to remove is not an error.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
    pub job_id: String,
    pub removed_uploads: bool,
    pub removed_artifact: bool,
    pub removed_record: bool,
    pub errors: Vec<String>,
}

impl CleanupReport {
    fn new(job_id: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            removed_uploads: false,
            removed_artifact: false,
            removed_record: false,
            errors: Vec::new(),
        }
    }
}

/// Deletes a job's namespaces and registry entry on demand.
///
/// There is no automatic trigger: absent an explicit call per job,
/// registry entries and their directories accumulate for the lifetime of
/// the process. Callers own the reclamation policy.
pub struct CleanupReaper {
    uploads_dir: PathBuf,
    models_dir: PathBuf,
    store: Arc<dyn JobStore>,
}

impl CleanupReaper {
    pub fn new(uploads_dir: PathBuf, models_dir: PathBuf, store: Arc<dyn JobStore>) -> Self {
        Self {
            uploads_dir,
            models_dir,
            store,
        }
    }

    /// Removes everything the job owns. Idempotent: a second call (or a
    /// call for an id that never existed) reports nothing removed and no
    /// errors.
    pub async fn reap(&self, id: &str) -> CleanupReport {
        let mut report = CleanupReport::new(id);

        let record = self.store.get(id).await;

        report.removed_uploads =
            remove_dir_best_effort(&self.uploads_dir.join(id), &mut report.errors).await;

        // The artifact normally lives inside the output namespace, but the
        // engine declares its own path, so remove the recorded file first.
        if let Some(artifact) = record.as_ref().and_then(|r| r.artifact_path.clone()) {
            report.removed_artifact =
                remove_file_best_effort(&artifact, &mut report.errors).await;
        }
        if remove_dir_best_effort(&self.models_dir.join(id), &mut report.errors).await {
            report.removed_artifact = true;
        }

        report.removed_record = self.store.remove(id).await.is_some();

        if report.removed_record {
            info!(job_id = %id, "Job cleaned up");
        }
        for error in &report.errors {
            warn!(job_id = %id, error = %error, "Cleanup step failed");
        }

        report
    }
}

async fn remove_dir_best_effort(path: &Path, errors: &mut Vec<String>) -> bool {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            errors.push(format!("{}: {}", path.display(), e));
            false
        }
    }
}

async fn remove_file_best_effort(path: &Path, errors: &mut Vec<String>) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            errors.push(format!("{}: {}", path.display(), e));
            false
        }
    }
}
