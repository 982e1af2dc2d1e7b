//! External processing engine: invocation, progress translation, outcome
//! handling.
//!
//! The engine is an opaque Python script. It receives one JSON argument
//! describing the job, logs free-text phase lines to stdout while it works,
//! and finishes with a single JSON result payload on stdout. A nonzero exit
//! code signals failure, with diagnostics on stderr.

mod config;
mod error;
mod launcher;
mod progress;
mod types;

pub use config::EngineConfig;
pub use error::EngineError;
pub use launcher::JobLauncher;
pub use progress::{MarkerTranslator, ProgressTranslator, ProgressUpdate};
pub use types::{EngineInvocation, EngineResult};
