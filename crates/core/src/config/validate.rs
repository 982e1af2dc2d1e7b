use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Engine concurrency and timeout are nonzero
/// - Ingest file cap is nonzero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.engine.max_parallel_jobs == 0 {
        return Err(ConfigError::ValidationError(
            "engine.max_parallel_jobs must be at least 1".to_string(),
        ));
    }

    if config.engine.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "engine.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.ingest.max_files == 0 {
        return Err(ConfigError::ValidationError(
            "ingest.max_files must be at least 1".to_string(),
        ));
    }

    Ok(())
}
