use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, jobs};
use crate::state::AppState;

/// DICOM series run to hundreds of slices; allow generously sized batches.
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Jobs
        .route("/jobs", post(jobs::create_job))
        .route("/jobs/{id}/status", get(jobs::get_status))
        .route("/jobs/{id}/artifact", get(jobs::download_artifact))
        .route("/jobs/{id}", delete(jobs::delete_job))
        .with_state(Arc::clone(&state));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics).with_state(state))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
