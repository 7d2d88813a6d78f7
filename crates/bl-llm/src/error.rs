//! Model adapter error types.

use thiserror::Error;

/// Ways the model path can fail.
///
/// Every variant is recoverable: the orchestrator records the failure and
/// falls back to pattern-only output rather than failing the request.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("model call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("model returned malformed output: {0}")]
    Schema(String),
}

/// Convenience alias for adapter results.
pub type AdapterResult<T> = Result<T, AdapterError>;
