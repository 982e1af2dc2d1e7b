use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scanforge_core::{load_config, validate_config, Config};
use scanforge_server::{create_router, AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("SCANFORGE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration, falling back to defaults when no file exists
    let config = if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        info!(
            "No config file at {:?}, using built-in defaults",
            config_path
        );
        Config::default()
    };

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Uploads directory: {:?}", config.storage.uploads_dir);
    info!("Models directory: {:?}", config.storage.models_dir);
    info!(
        "Engine: {:?} {:?} (max {} parallel)",
        config.engine.python_path, config.engine.script_path, config.engine.max_parallel_jobs
    );

    // Ensure job namespace roots exist before accepting uploads
    tokio::fs::create_dir_all(&config.storage.uploads_dir)
        .await
        .context("Failed to create uploads directory")?;
    tokio::fs::create_dir_all(&config.storage.models_dir)
        .await
        .context("Failed to create models directory")?;

    // Create app state
    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config));
    let launcher = Arc::clone(state.launcher());

    // Create router
    let app = create_router(state);

    // Start server
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Let in-flight engine runs finish writing their job records
    info!("Server shutting down, waiting for in-flight jobs...");
    launcher.shutdown().await;
    info!("All job tasks finished");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
