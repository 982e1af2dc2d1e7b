//! Configuration for the engine launcher.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for invoking the DICOM processing engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Python interpreter used to run the engine.
    #[serde(default = "default_python_path")]
    pub python_path: PathBuf,

    /// Path to the engine entry-point script.
    #[serde(default = "default_script_path")]
    pub script_path: PathBuf,

    /// Timeout for a single engine run in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum engine processes running at once; jobs beyond this wait
    /// in admission order.
    #[serde(default = "default_max_parallel")]
    pub max_parallel_jobs: usize,
}

fn default_python_path() -> PathBuf {
    PathBuf::from("python3")
}

fn default_script_path() -> PathBuf {
    PathBuf::from("processing/process.py")
}

fn default_timeout() -> u64 {
    1800 // 30 minutes
}

fn default_max_parallel() -> usize {
    2
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            python_path: default_python_path(),
            script_path: default_script_path(),
            timeout_secs: default_timeout(),
            max_parallel_jobs: default_max_parallel(),
        }
    }
}

impl EngineConfig {
    /// Creates a config with custom interpreter and script paths.
    pub fn with_paths(python_path: PathBuf, script_path: PathBuf) -> Self {
        Self {
            python_path,
            script_path,
            ..Default::default()
        }
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the maximum parallel engine runs.
    pub fn with_max_parallel(mut self, max: usize) -> Self {
        self.max_parallel_jobs = max;
        self
    }
}
