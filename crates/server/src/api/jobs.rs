//! Job API handlers: upload, status polling, artifact download, cleanup.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use scanforge_core::{ArtifactError, CleanupReport, IngestError, JobParams, JobStatus, UploadedFile};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub job_id: String,
}

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ArtifactConflictResponse {
    pub error: String,
    pub status: JobStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/jobs
///
/// Accepts a multipart batch of `.dcm` files plus the two required selector
/// fields and returns the new job id. The engine run starts in the
/// background; this call never waits for it.
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let mut files: Vec<UploadedFile> = Vec::new();
    let mut anatomical_structure = String::new();
    let mut print_material = String::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            // A parse error mid-stream means the batch is incomplete;
            // admitting the parts that did arrive would create a partial job.
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Malformed upload: {}", e),
                )
            }
        };
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "files" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                match field.bytes().await {
                    Ok(bytes) => files.push(UploadedFile {
                        name: file_name,
                        data: bytes.to_vec(),
                    }),
                    Err(e) => {
                        return error_response(
                            StatusCode::BAD_REQUEST,
                            format!("Failed to read file: {}", e),
                        )
                    }
                }
            }
            "anatomical_structure" => {
                if let Ok(text) = field.text().await {
                    anatomical_structure = text;
                }
            }
            "print_material" => {
                if let Ok(text) = field.text().await {
                    print_material = text;
                }
            }
            _ => {}
        }
    }

    let params = JobParams {
        anatomical_structure,
        print_material,
    };

    match state.gate().admit(files, params).await {
        Ok(job_id) => {
            state.launcher().launch(job_id.clone());
            (StatusCode::CREATED, Json(CreateJobResponse { job_id })).into_response()
        }
        Err(e @ (IngestError::Io(_) | IngestError::Store(_))) => {
            error!(error = %e, "Upload admission failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error uploading files")
        }
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

/// GET /api/v1/jobs/{id}/status
///
/// Current status snapshot; always well-formed, including mid-failure.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.store().get(&id).await {
        Some(record) => Json(JobStatusResponse {
            status: record.status,
            progress: record.progress,
            message: record.message,
            error: record.error_detail,
        })
        .into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("Job not found: {}", id)),
    }
}

/// GET /api/v1/jobs/{id}/artifact
///
/// Streams the STL for a Completed job; otherwise a conflict echoing the
/// job's current state.
pub async fn download_artifact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let handle = match state.gateway().resolve(&id).await {
        Ok(handle) => handle,
        Err(e @ ArtifactError::UnknownJob(_)) | Err(e @ ArtifactError::FileMissing(_)) => {
            return error_response(StatusCode::NOT_FOUND, e.to_string())
        }
        Err(ArtifactError::NotReady {
            status,
            progress,
            error_detail,
            ..
        }) => {
            return (
                StatusCode::CONFLICT,
                Json(ArtifactConflictResponse {
                    error: "Processing not completed or STL not available".to_string(),
                    status,
                    progress,
                    error_detail,
                }),
            )
                .into_response()
        }
    };

    let bytes = match tokio::fs::read(&handle.path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(job_id = %id, error = %e, "Failed to read artifact");
            return error_response(
                StatusCode::NOT_FOUND,
                format!("STL file not found for job {}", id),
            );
        }
    };

    (
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", handle.file_name),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// DELETE /api/v1/jobs/{id}
///
/// Reclaims the job's files and registry entry. Safe to repeat; an unknown
/// id yields a report with nothing removed.
pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<CleanupReport> {
    Json(state.reaper().reap(&id).await)
}
