//! Rule engine error types.

use thiserror::Error;

/// Errors raised while building or loading rule packs.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule pack has no rules")]
    EmptyPack,

    #[error("rule {rule}: weight {weight} outside (0, 1]")]
    Weight { rule: String, weight: f64 },

    #[error("rule {rule}: matcher has no usable terms")]
    EmptyMatcher { rule: String },

    #[error("rule {rule}: invalid regex: {message}")]
    Pattern { rule: String, message: String },

    #[error("duplicate rule name: {0}")]
    DuplicateRule(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Convenience alias for rule engine results.
pub type RuleResult<T> = Result<T, RuleError>;
