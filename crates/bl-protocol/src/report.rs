//! Per-request observability record emitted alongside every result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which path the orchestrator took for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathTaken {
    /// Pattern confidence cleared the short-circuit threshold; the model
    /// was never consulted.
    ShortCircuit,
    /// Pattern output was absent or weak; the model ran and answered.
    Escalated,
    /// The model ran and failed; the result is pattern-only (degraded).
    ModelFailed,
    /// The model was configured off; pattern output stands alone.
    PatternOnly,
}

impl PathTaken {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortCircuit => "short_circuit",
            Self::Escalated => "escalated",
            Self::ModelFailed => "model_failed",
            Self::PatternOnly => "pattern_only",
        }
    }
}

impl std::fmt::Display for PathTaken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How one request moved through the engine.
///
/// Carried inside the result rather than logged separately so callers can
/// persist or forward it without re-deriving anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineReport {
    /// Engine-assigned request id (UUIDv7, time-ordered).
    pub request_id: Uuid,
    /// When classification finished.
    pub classified_at: DateTime<Utc>,
    /// Path the orchestrator took.
    pub path: PathTaken,
    /// Hypotheses the pattern engine produced before merging.
    pub pattern_hypotheses: usize,
    /// Hypotheses the model adapter produced before merging.
    pub model_hypotheses: usize,
    /// Adapter error message when `path` is `model_failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_error: Option<String>,
    /// End-to-end latency of the request.
    pub latency_ms: u64,
}

impl EngineReport {
    pub fn new(
        path: PathTaken,
        pattern_hypotheses: usize,
        model_hypotheses: usize,
        model_error: Option<String>,
        latency_ms: u64,
    ) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            classified_at: Utc::now(),
            path,
            pattern_hypotheses,
            model_hypotheses,
            model_error,
            latency_ms,
        }
    }
}
