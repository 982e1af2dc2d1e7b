use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle state of a conversion job.
///
/// Transitions are monotonic: Uploaded → Processing → {Completed | Failed},
/// with Failed also reachable directly from Uploaded (e.g. the engine never
/// started). Completed and Failed are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Parameters supplied at upload time, both required.
///
/// Only the anatomical structure is forwarded to the engine; the print
/// material is recorded for the operator and never influences segmentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobParams {
    pub anatomical_structure: String,
    pub print_material: String,
}

/// One unit of work: a batch of DICOM files on its way to a single STL.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub id: String,
    pub status: JobStatus,
    /// 0-100, never decreases while the job is Processing.
    pub progress: u8,
    /// Human-readable description of the current phase.
    pub message: String,
    pub params: JobParams,
    /// Set if and only if the job is Completed.
    pub artifact_path: Option<PathBuf>,
    /// Set if and only if the job is Failed.
    pub error_detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn new(id: String, params: JobParams) -> Self {
        Self {
            id,
            status: JobStatus::Uploaded,
            progress: 0,
            message: "Files uploaded successfully".to_string(),
            params,
            artifact_path: None,
            error_detail: None,
            created_at: Utc::now(),
        }
    }
}
