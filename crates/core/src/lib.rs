pub mod artifact;
pub mod cleanup;
pub mod config;
pub mod engine;
pub mod ingest;
pub mod job;
pub mod metrics;
pub mod testing;

pub use artifact::{ArtifactError, ArtifactGateway, ArtifactHandle};
pub use cleanup::{CleanupReaper, CleanupReport};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, IngestConfig,
    ServerConfig, StorageConfig,
};
pub use engine::{
    EngineConfig, EngineError, EngineInvocation, EngineResult, JobLauncher, MarkerTranslator,
    ProgressTranslator, ProgressUpdate,
};
pub use ingest::{IngestError, IngestionGate, UploadedFile};
pub use job::{JobParams, JobRecord, JobStatus, JobStore, MemoryJobStore, StoreError};
