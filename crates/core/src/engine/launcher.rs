//! Spawns and supervises engine processes, one child task per job.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tracing::{error, info, warn};

use crate::config::StorageConfig;
use crate::job::{JobStatus, JobStore};
use crate::metrics;

use super::config::EngineConfig;
use super::error::EngineError;
use super::progress::ProgressTranslator;
use super::types::{EngineInvocation, EngineResult};

/// Progress value set when a job enters Processing, before the engine has
/// produced any output.
pub const PROCESSING_BASELINE_PROGRESS: u8 = 20;

/// Launches the engine for admitted jobs and drives their records to a
/// terminal state.
///
/// Each job runs as an independent tokio task; tasks never share state
/// beyond writing to their own job record. Admission is bounded by a
/// semaphore sized from `EngineConfig::max_parallel_jobs`, and every task
/// handle is tracked so `shutdown` can await in-flight runs instead of
/// abandoning them.
pub struct JobLauncher {
    config: EngineConfig,
    storage: StorageConfig,
    store: Arc<dyn JobStore>,
    translator: Arc<dyn ProgressTranslator>,
    semaphore: Arc<Semaphore>,
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl JobLauncher {
    pub fn new(
        config: EngineConfig,
        storage: StorageConfig,
        store: Arc<dyn JobStore>,
        translator: Arc<dyn ProgressTranslator>,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_parallel_jobs));
        Self {
            config,
            storage,
            store,
            translator,
            semaphore,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Starts the engine for a freshly uploaded job.
    ///
    /// Returns immediately; the run happens in a background task whose
    /// outcome lands on the job record. Once started, a run cannot be
    /// cancelled; it proceeds to natural completion or failure.
    pub fn launch(self: &Arc<Self>, job_id: String) {
        let launcher = Arc::clone(self);
        let id = job_id.clone();
        let handle = tokio::spawn(async move {
            launcher.run_job(&id).await;
            launcher.tasks.lock().expect("tasks lock poisoned").remove(&id);
        });
        self.tasks
            .lock()
            .expect("tasks lock poisoned")
            .insert(job_id, handle);
    }

    /// Number of job tasks not yet finished.
    pub fn inflight(&self) -> usize {
        self.tasks.lock().expect("tasks lock poisoned").len()
    }

    /// Awaits every outstanding job task. Call during server shutdown so
    /// running engines finish writing their job records.
    pub async fn shutdown(&self) {
        let handles: Vec<(String, JoinHandle<()>)> = self
            .tasks
            .lock()
            .expect("tasks lock poisoned")
            .drain()
            .collect();
        for (id, handle) in handles {
            if let Err(e) = handle.await {
                error!(job_id = %id, error = %e, "Job task panicked");
            }
        }
    }

    async fn run_job(&self, id: &str) {
        // Precondition: the job exists and has not been picked up before.
        match self.store.get(id).await {
            Some(record) if record.status == JobStatus::Uploaded => {}
            Some(record) => {
                warn!(job_id = %id, status = ?record.status, "Refusing to launch non-Uploaded job");
                return;
            }
            None => {
                warn!(job_id = %id, "Launch requested for unknown job");
                return;
            }
        }

        if self.semaphore.available_permits() == 0 {
            let _ = self
                .store
                .set_message(id, "Waiting for a processing slot...")
                .await;
        }
        let permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_) => return,
        };

        metrics::ACTIVE_ENGINE_RUNS.inc();
        let start = Instant::now();
        let result = self.run_engine(id).await;
        metrics::ACTIVE_ENGINE_RUNS.dec();
        metrics::ENGINE_RUN_DURATION.observe(start.elapsed().as_secs_f64());
        drop(permit);

        match result {
            Ok(artifact_path) => match self.store.complete(id, artifact_path).await {
                Ok(()) => {
                    metrics::JOBS_COMPLETED.inc();
                    info!(job_id = %id, "Job completed");
                }
                Err(e) => error!(job_id = %id, error = %e, "Failed to record completion"),
            },
            Err(e) => {
                metrics::JOBS_FAILED.inc();
                warn!(job_id = %id, error = %e, "Job failed");
                if let Err(store_err) = self.store.fail(id, &e.to_string()).await {
                    error!(job_id = %id, error = %store_err, "Failed to record failure");
                }
            }
        }
    }

    /// Runs one engine process to completion, streaming stdout through the
    /// progress translator. Returns the artifact path on success.
    async fn run_engine(&self, id: &str) -> Result<PathBuf, EngineError> {
        let record = self
            .store
            .get(id)
            .await
            .ok_or_else(|| EngineError::launch("job removed from registry before launch"))?;

        let input_dir = self.storage.uploads_dir.join(id);
        let output_dir = self.storage.models_dir.join(id);
        tokio::fs::create_dir_all(&output_dir).await?;

        self.store
            .mark_processing(id, PROCESSING_BASELINE_PROGRESS, "Processing DICOM files...")
            .await
            .map_err(|e| EngineError::launch(format!("registry rejected transition: {}", e)))?;

        let invocation = EngineInvocation {
            input_dir,
            output_dir,
            anatomical_structure: record.params.anatomical_structure.clone(),
        };
        let config_json = serde_json::to_string(&invocation)
            .map_err(|e| EngineError::launch(format!("failed to encode invocation: {}", e)))?;

        let mut child = Command::new(&self.config.python_path)
            .arg(&self.config.script_path)
            .arg(&config_json)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::launch(e.to_string()))?;

        let stdout = child.stdout.take().expect("stdout should be captured");
        let stderr = child.stderr.take().expect("stderr should be captured");

        // Stderr is diagnostics only; buffer it aside without letting it
        // drive status.
        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let mut reader = BufReader::new(stderr);
            let _ = reader.read_to_string(&mut buf).await;
            buf
        });

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let run = timeout(timeout_duration, async {
            let mut lines = BufReader::new(stdout).lines();
            let mut captured = String::new();

            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(update) = self.translator.translate(&line) {
                    let _ = self
                        .store
                        .update_progress(id, update.progress, &update.message)
                        .await;
                }
                captured.push_str(&line);
                captured.push('\n');
            }

            let status = child.wait().await?;
            Ok::<(std::process::ExitStatus, String), std::io::Error>((status, captured))
        })
        .await;

        let (status, stdout_text) = match run {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => return Err(EngineError::Io(e)),
            Err(_) => {
                let _ = child.kill().await;
                return Err(EngineError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        let stderr_text = stderr_task.await.unwrap_or_default();

        if !status.success() {
            let detail = if stderr_text.trim().is_empty() {
                "Processing failed".to_string()
            } else {
                stderr_text.trim().to_string()
            };
            return Err(EngineError::exit_failure(detail));
        }

        let payload = EngineResult::from_stdout(&stdout_text)
            .map_err(|e| EngineError::parse(e.to_string()))?;

        if let Some(engine_error) = payload.error {
            return Err(EngineError::Reported(engine_error));
        }

        payload
            .stl_path
            .ok_or_else(|| EngineError::parse("result payload missing stl_path"))
    }
}
