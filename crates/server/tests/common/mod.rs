//! Common test utilities for in-process API testing.
//!
//! The fixture builds the full router against temp directories and a shell
//! script standing in for the Python engine, so lifecycle tests exercise
//! real process spawning without a real imaging stack.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use scanforge_core::testing::{write_engine_script, SUCCEEDING_ENGINE};
use scanforge_core::{Config, EngineConfig, IngestConfig, StorageConfig};
use scanforge_server::{create_router, AppState};

pub use scanforge_core::testing::dicom_bytes;

pub const BOUNDARY: &str = "scanforge-test-boundary";

/// In-process server plus the temp directories backing it.
pub struct TestFixture {
    pub router: Router,
    pub temp_dir: TempDir,
}

/// Response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub bytes: Vec<u8>,
}

impl TestFixture {
    /// Fixture with an engine that completes successfully.
    pub async fn new() -> Self {
        Self::with_engine(SUCCEEDING_ENGINE).await
    }

    /// Fixture with a custom engine script (see `scanforge_core::testing`).
    pub async fn with_engine(engine_script: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let script_path = write_engine_script(temp_dir.path(), engine_script);

        let config = Config {
            storage: StorageConfig {
                uploads_dir: temp_dir.path().join("uploads"),
                models_dir: temp_dir.path().join("models"),
            },
            engine: EngineConfig::with_paths(PathBuf::from("sh"), script_path)
                .with_timeout(30)
                .with_max_parallel(2),
            ingest: IngestConfig { max_files: 10 },
            ..Default::default()
        };

        let state = Arc::new(AppState::new(config));
        let router = create_router(state);

        Self { router, temp_dir }
    }

    /// Send a GET request.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.request(request).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("DELETE")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.request(request).await
    }

    /// Upload a batch of files via multipart, with optional selector fields.
    pub async fn upload(
        &self,
        files: &[(&str, Vec<u8>)],
        anatomical_structure: Option<&str>,
        print_material: Option<&str>,
    ) -> TestResponse {
        let mut body = Vec::new();
        for (name, data) in files {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    BOUNDARY, name
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        for (field, value) in [
            ("anatomical_structure", anatomical_structure),
            ("print_material", print_material),
        ] {
            if let Some(value) = value {
                body.extend_from_slice(
                    format!(
                        "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                        BOUNDARY, field, value
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/jobs")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.request(request).await
    }

    /// Posts a pre-built multipart body as-is, for malformed-body tests.
    pub async fn upload_raw(&self, body: Vec<u8>) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/jobs")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.request(request).await
    }

    /// Convenience: upload a valid 3-file batch with both selectors set.
    pub async fn upload_valid_batch(&self) -> String {
        let response = self
            .upload(
                &[
                    ("slice-001.dcm", dicom_bytes()),
                    ("slice-002.dcm", dicom_bytes()),
                    ("slice-003.dcm", dicom_bytes()),
                ],
                Some("bone"),
                Some("pla"),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["job_id"].as_str().unwrap().to_string()
    }

    /// Polls the status endpoint until the job reaches a terminal state,
    /// returning the final status body.
    pub async fn wait_for_terminal(&self, job_id: &str) -> Value {
        for _ in 0..200 {
            let response = self.get(&format!("/api/v1/jobs/{}/status", job_id)).await;
            assert_eq!(response.status, StatusCode::OK);
            let status = response.body["status"].as_str().unwrap_or("").to_string();
            if status == "completed" || status == "failed" {
                return response.body;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("job {} never reached a terminal state", job_id);
    }

    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes()
            .to_vec();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            bytes,
        }
    }
}
