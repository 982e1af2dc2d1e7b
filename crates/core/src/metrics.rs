//! Prometheus metrics for the job orchestration core.

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Registry};

/// Jobs admitted through ingestion.
pub static JOBS_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("scanforge_jobs_created_total", "Total jobs created").unwrap()
});

/// Jobs that reached Completed.
pub static JOBS_COMPLETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "scanforge_jobs_completed_total",
        "Total jobs completed successfully",
    )
    .unwrap()
});

/// Jobs that reached Failed.
pub static JOBS_FAILED: Lazy<IntCounter> =
    Lazy::new(|| IntCounter::new("scanforge_jobs_failed_total", "Total jobs failed").unwrap());

/// Engine runs currently in flight (admitted past the semaphore).
pub static ACTIVE_ENGINE_RUNS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "scanforge_active_engine_runs",
        "Engine processes currently running",
    )
    .unwrap()
});

/// Wall-clock duration of engine runs in seconds.
pub static ENGINE_RUN_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "scanforge_engine_run_duration_seconds",
            "Duration of engine runs",
        )
        .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
    )
    .unwrap()
});

/// Registers all core metrics on the given registry.
///
/// Registration errors (double registration in tests) are ignored.
pub fn register_all(registry: &Registry) {
    let _ = registry.register(Box::new(JOBS_CREATED.clone()));
    let _ = registry.register(Box::new(JOBS_COMPLETED.clone()));
    let _ = registry.register(Box::new(JOBS_FAILED.clone()));
    let _ = registry.register(Box::new(ACTIVE_ENGINE_RUNS.clone()));
    let _ = registry.register(Box::new(ENGINE_RUN_DURATION.clone()));
}
