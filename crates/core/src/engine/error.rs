//! Error types for the engine module.

use thiserror::Error;

/// Errors from one engine run.
///
/// These are recorded on the owning job record rather than propagated to
/// the caller that started the run; the display strings become the job's
/// `error_detail`.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine process could not be started at all.
    #[error("Failed to start engine: {reason}")]
    Launch { reason: String },

    /// The engine exited with a nonzero code.
    #[error("{detail}")]
    ExitFailure { detail: String },

    /// The engine exited cleanly but its result payload was malformed.
    #[error("Failed to parse engine output: {reason}")]
    ParseError { reason: String },

    /// The engine reported a domain error in its result payload.
    #[error("{0}")]
    Reported(String),

    /// The engine exceeded the configured run time and was killed.
    #[error("Engine timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error while managing the child process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn launch(reason: impl Into<String>) -> Self {
        Self::Launch {
            reason: reason.into(),
        }
    }

    pub fn exit_failure(detail: impl Into<String>) -> Self {
        Self::ExitFailure {
            detail: detail.into(),
        }
    }

    pub fn parse(reason: impl Into<String>) -> Self {
        Self::ParseError {
            reason: reason.into(),
        }
    }
}
