use prometheus::Registry;
use std::sync::Arc;

use scanforge_core::{
    metrics, ArtifactGateway, CleanupReaper, Config, IngestionGate, JobLauncher, JobStore,
    MarkerTranslator, MemoryJobStore,
};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn JobStore>,
    gate: IngestionGate,
    launcher: Arc<JobLauncher>,
    gateway: ArtifactGateway,
    reaper: CleanupReaper,
    registry: Registry,
}

impl AppState {
    /// Wires the orchestration components around a single shared registry.
    pub fn new(config: Config) -> Self {
        let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());

        let gate = IngestionGate::new(
            config.storage.uploads_dir.clone(),
            config.ingest.max_files,
            Arc::clone(&store),
        );
        let launcher = Arc::new(JobLauncher::new(
            config.engine.clone(),
            config.storage.clone(),
            Arc::clone(&store),
            Arc::new(MarkerTranslator::new()),
        ));
        let gateway = ArtifactGateway::new(Arc::clone(&store));
        let reaper = CleanupReaper::new(
            config.storage.uploads_dir.clone(),
            config.storage.models_dir.clone(),
            Arc::clone(&store),
        );

        let registry = Registry::new();
        metrics::register_all(&registry);

        Self {
            config,
            store,
            gate,
            launcher,
            gateway,
            reaper,
            registry,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &dyn JobStore {
        self.store.as_ref()
    }

    pub fn gate(&self) -> &IngestionGate {
        &self.gate
    }

    pub fn launcher(&self) -> &Arc<JobLauncher> {
        &self.launcher
    }

    pub fn gateway(&self) -> &ArtifactGateway {
        &self.gateway
    }

    pub fn reaper(&self) -> &CleanupReaper {
        &self.reaper
    }

    pub fn metrics_registry(&self) -> &Registry {
        &self.registry
    }
}
