//! Engine setup errors.
//!
//! Everything here is fatal at startup. Once a classifier is built,
//! classification itself never fails: model trouble degrades to
//! pattern-only output and always yields a result.

use bl_rules::RuleError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file error: {0}")]
    Io(String),

    #[error("config parse error: {0}")]
    Parse(String),

    #[error("rule pack error: {0}")]
    Rules(#[from] RuleError),

    #[error("threshold {name} = {value} must be within 0.0..=1.0")]
    Threshold { name: &'static str, value: f64 },

    #[error("max_intents must be at least 1")]
    MaxIntents,

    #[error("pattern bias for {intent} is {bias}; must be greater than 0 and at most 2")]
    Bias { intent: String, bias: f64 },

    #[error("unknown intent id in pattern bias overlay: {0}")]
    UnknownIntent(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
