use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::engine::EngineConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8000
}

/// Filesystem layout for job namespaces.
///
/// Each job owns one directory under `uploads_dir` (its DICOM series) and
/// one under `models_dir` (the produced STL). Directories are never shared
/// across jobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            models_dir: default_models_dir(),
        }
    }
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

/// Upload admission limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    /// Maximum number of DICOM files accepted in one batch.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
        }
    }
}

fn default_max_files() -> usize {
    350
}
