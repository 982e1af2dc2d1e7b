//! End-to-end job lifecycle tests against fake engines.

mod common;

use axum::http::{header, StatusCode};
use scanforge_core::testing::{
    CRASHING_ENGINE, GARBAGE_OUTPUT_ENGINE, SLOW_SUCCEEDING_ENGINE, SUCCEEDING_ENGINE,
};

use common::TestFixture;

#[tokio::test]
async fn test_successful_job_reaches_completed_and_serves_artifact() {
    let fixture = TestFixture::with_engine(SUCCEEDING_ENGINE).await;
    let job_id = fixture.upload_valid_batch().await;

    let final_status = fixture.wait_for_terminal(&job_id).await;
    assert_eq!(final_status["status"], "completed");
    assert_eq!(final_status["progress"], 100);
    assert!(final_status["error"].is_null());

    let response = fixture
        .get(&format!("/api/v1/jobs/{}/artifact", job_id))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.bytes.starts_with(b"solid"));

    let disposition = response
        .headers
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.contains(&format!("{}.stl", job_id)));
}

#[tokio::test]
async fn test_progress_is_monotonic_while_processing() {
    let fixture = TestFixture::with_engine(SLOW_SUCCEEDING_ENGINE).await;
    let job_id = fixture.upload_valid_batch().await;

    let mut last_progress = 0u64;
    for _ in 0..400 {
        let response = fixture.get(&format!("/api/v1/jobs/{}/status", job_id)).await;
        let progress = response.body["progress"].as_u64().unwrap();
        assert!(
            progress >= last_progress,
            "progress went backwards: {} -> {}",
            last_progress,
            progress
        );
        last_progress = progress;
        if response.body["status"] == "completed" || response.body["status"] == "failed" {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(25)).await;
    }
    assert_eq!(last_progress, 100);
}

#[tokio::test]
async fn test_artifact_request_before_completion_conflicts() {
    let fixture = TestFixture::with_engine(SLOW_SUCCEEDING_ENGINE).await;
    let job_id = fixture.upload_valid_batch().await;

    let response = fixture
        .get(&format!("/api/v1/jobs/{}/artifact", job_id))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    let status = response.body["status"].as_str().unwrap();
    assert!(status == "uploaded" || status == "processing");

    // The job still runs to completion afterwards.
    let final_status = fixture.wait_for_terminal(&job_id).await;
    assert_eq!(final_status["status"], "completed");
}

#[tokio::test]
async fn test_engine_crash_surfaces_stderr_in_status() {
    let fixture = TestFixture::with_engine(CRASHING_ENGINE).await;
    let job_id = fixture.upload_valid_batch().await;

    let final_status = fixture.wait_for_terminal(&job_id).await;
    assert_eq!(final_status["status"], "failed");
    assert!(final_status["error"]
        .as_str()
        .unwrap()
        .contains("fatal: out of memory"));

    // Artifact retrieval reports the failure, never bytes.
    let response = fixture
        .get(&format!("/api/v1/jobs/{}/artifact", job_id))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert!(response.body["error_detail"]
        .as_str()
        .unwrap()
        .contains("fatal: out of memory"));
}

#[tokio::test]
async fn test_unparseable_payload_gets_distinct_error() {
    let fixture = TestFixture::with_engine(GARBAGE_OUTPUT_ENGINE).await;
    let job_id = fixture.upload_valid_batch().await;

    let final_status = fixture.wait_for_terminal(&job_id).await;
    assert_eq!(final_status["status"], "failed");
    let error = final_status["error"].as_str().unwrap();
    assert!(error.contains("Failed to parse engine output"));
    assert!(!error.contains("fatal"));
}

#[tokio::test]
async fn test_completed_job_with_deleted_file_is_not_found() {
    let fixture = TestFixture::with_engine(SUCCEEDING_ENGINE).await;
    let job_id = fixture.upload_valid_batch().await;
    fixture.wait_for_terminal(&job_id).await;

    // Pull the file out from under the registry.
    let artifact = fixture
        .temp_dir
        .path()
        .join("models")
        .join(&job_id)
        .join("model.stl");
    std::fs::remove_file(&artifact).unwrap();

    let response = fixture
        .get(&format!("/api/v1/jobs/{}/artifact", job_id))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("STL file not found"));
}

#[tokio::test]
async fn test_cleanup_removes_files_and_record_idempotently() {
    let fixture = TestFixture::with_engine(SUCCEEDING_ENGINE).await;
    let job_id = fixture.upload_valid_batch().await;
    fixture.wait_for_terminal(&job_id).await;

    let uploads = fixture.temp_dir.path().join("uploads").join(&job_id);
    let models = fixture.temp_dir.path().join("models").join(&job_id);
    assert!(uploads.exists());
    assert!(models.exists());

    let response = fixture.delete(&format!("/api/v1/jobs/{}", job_id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["removed_uploads"], true);
    assert_eq!(response.body["removed_artifact"], true);
    assert_eq!(response.body["removed_record"], true);
    assert!(!uploads.exists());
    assert!(!models.exists());

    // Second invocation: no-op, no residual files, no errors.
    let response = fixture.delete(&format!("/api/v1/jobs/{}", job_id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["removed_uploads"], false);
    assert_eq!(response.body["removed_artifact"], false);
    assert_eq!(response.body["removed_record"], false);
    assert_eq!(response.body["errors"].as_array().unwrap().len(), 0);

    // The job is gone from every endpoint.
    let response = fixture.get(&format!("/api/v1/jobs/{}/status", job_id)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    let response = fixture
        .get(&format!("/api/v1/jobs/{}/artifact", job_id))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_parallel_jobs_complete_independently() {
    let fixture = TestFixture::with_engine(SUCCEEDING_ENGINE).await;
    let first = fixture.upload_valid_batch().await;
    let second = fixture.upload_valid_batch().await;
    assert_ne!(first, second);

    let a = fixture.wait_for_terminal(&first).await;
    let b = fixture.wait_for_terminal(&second).await;
    assert_eq!(a["status"], "completed");
    assert_eq!(b["status"], "completed");

    // Each job got its own artifact in its own namespace.
    let response = fixture.get(&format!("/api/v1/jobs/{}/artifact", first)).await;
    assert_eq!(response.status, StatusCode::OK);
    let response = fixture.get(&format!("/api/v1/jobs/{}/artifact", second)).await;
    assert_eq!(response.status, StatusCode::OK);
}
