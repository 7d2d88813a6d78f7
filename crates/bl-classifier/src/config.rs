//! Engine configuration, loadable from TOML or environment.

use std::collections::BTreeMap;

use bl_llm::OllamaConfig;
use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

/// Top-level configuration for the classification engine.
///
/// Loaded once at startup, validated, then passed into the orchestrator
/// and never consulted ambiently.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Pattern confidence at or above which the model path is skipped.
    #[serde(default = "default_pattern_match_threshold")]
    pub pattern_match_threshold: f64,
    /// Model hypotheses below this confidence are dropped by the adapter.
    #[serde(default = "default_llm_classification_threshold")]
    pub llm_classification_threshold: f64,
    /// Non-primary hypotheses below this confidence are dropped in merge.
    #[serde(default = "default_secondary_intent_threshold")]
    pub secondary_intent_threshold: f64,
    /// Top confidence below this asks the user to clarify.
    #[serde(default = "default_clarification_threshold")]
    pub clarification_threshold: f64,
    /// Upper bound on intents in one result.
    #[serde(default = "default_max_intents")]
    pub max_intents: usize,
    /// Model escalation path settings. Optional — defaults to enabled.
    #[serde(default)]
    pub model: ModelConfig,
    /// Per-intent pattern weight bias overlay, keyed by intent id.
    #[serde(default)]
    pub pattern_bias: BTreeMap<String, f64>,
    /// TOML rule pack to load instead of the builtin pack.
    #[serde(default)]
    pub rule_pack_path: Option<String>,
}

fn default_pattern_match_threshold() -> f64 {
    0.9
}
fn default_llm_classification_threshold() -> f64 {
    0.3
}
fn default_secondary_intent_threshold() -> f64 {
    0.6
}
fn default_clarification_threshold() -> f64 {
    0.5
}
fn default_max_intents() -> usize {
    3
}

/// Model escalation path settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Whether the model path is available at all.
    #[serde(default = "default_model_enabled")]
    pub enabled: bool,
    /// Deadline for one model call, in seconds.
    #[serde(default = "default_model_timeout_secs")]
    pub timeout_secs: u64,
    /// Ollama endpoint settings.
    #[serde(default)]
    pub ollama: OllamaConfig,
}

fn default_model_enabled() -> bool {
    true
}
fn default_model_timeout_secs() -> u64 {
    5
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            enabled: default_model_enabled(),
            timeout_secs: default_model_timeout_secs(),
            ollama: OllamaConfig::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pattern_match_threshold: default_pattern_match_threshold(),
            llm_classification_threshold: default_llm_classification_threshold(),
            secondary_intent_threshold: default_secondary_intent_threshold(),
            clarification_threshold: default_clarification_threshold(),
            max_intents: default_max_intents(),
            model: ModelConfig::default(),
            pattern_bias: BTreeMap::new(),
            rule_pack_path: None,
        }
    }
}

impl EngineConfig {
    /// Load and validate config from a TOML file path.
    pub fn from_file(path: &str) -> ConfigResult<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(format!("{path}: {e}")))?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Build config from environment variables over the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("BOOKLINE_MODEL_ENABLED") {
            config.model.enabled = v.eq_ignore_ascii_case("true") || v == "1";
        }
        if let Ok(host) = std::env::var("BOOKLINE_OLLAMA_HOST") {
            config.model.ollama.host = host;
        }
        if let Ok(model) = std::env::var("BOOKLINE_OLLAMA_MODEL") {
            config.model.ollama.model = model;
        }
        config
    }

    /// Check thresholds and bounds. Violations are fatal at startup.
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [
            ("pattern_match_threshold", self.pattern_match_threshold),
            (
                "llm_classification_threshold",
                self.llm_classification_threshold,
            ),
            ("secondary_intent_threshold", self.secondary_intent_threshold),
            ("clarification_threshold", self.clarification_threshold),
        ] {
            // contains() is false for NaN, so NaN is rejected as well.
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Threshold { name, value });
            }
        }
        if self.max_intents == 0 {
            return Err(ConfigError::MaxIntents);
        }
        Ok(())
    }
}
