//! Classification orchestrator.
//!
//! Sequences one request through the engine: pattern engine first, then
//! either short-circuit on a confident match or escalate to the model
//! adapter, then merge, rank, and apply the clarification policy. Model
//! failures never propagate; the worst case is a pattern-only result.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bl_llm::{CompletionBackend, ModelAdapter, OllamaBackend};
use bl_protocol::{ClarificationReason, ClassificationResult, EngineReport, PathTaken};
use bl_rules::{PatternEngine, RulePack};

use crate::config::EngineConfig;
use crate::error::ConfigResult;
use crate::merge;
use crate::registry::IntentRegistry;

/// The classification engine, assembled and validated at startup.
///
/// Holds no mutable state; one instance serves any number of concurrent
/// `classify` calls.
pub struct Classifier {
    config: EngineConfig,
    engine: PatternEngine,
    adapter: Option<ModelAdapter>,
}

impl Classifier {
    /// Build from explicit parts. `backend: None` keeps the engine
    /// pattern-only; every escalation-eligible request then degrades the
    /// same way a failed model call would.
    pub fn new(
        config: EngineConfig,
        pack: RulePack,
        backend: Option<Arc<dyn CompletionBackend>>,
    ) -> ConfigResult<Self> {
        config.validate()?;
        let registry = IntentRegistry::with_bias(&config.pattern_bias)?;
        let engine = PatternEngine::new(pack, registry.definitions());
        let adapter = backend.map(|backend| {
            ModelAdapter::new(
                backend,
                registry.definitions(),
                Duration::from_secs(config.model.timeout_secs),
                config.llm_classification_threshold,
                config.max_intents,
            )
        });
        Ok(Self {
            config,
            engine,
            adapter,
        })
    }

    /// Build the wiring a config describes: builtin or TOML rule pack,
    /// Ollama backend when the model path is enabled.
    pub fn from_config(config: EngineConfig) -> ConfigResult<Self> {
        let pack = match &config.rule_pack_path {
            Some(path) => RulePack::from_file(path)?,
            None => RulePack::builtin(),
        };
        let backend: Option<Arc<dyn CompletionBackend>> = if config.model.enabled {
            Some(Arc::new(OllamaBackend::new(config.model.ollama.clone())))
        } else {
            tracing::info!("model path disabled, running pattern-only");
            None
        };
        Self::new(config, pack, backend)
    }

    /// Classify one utterance. Always returns a result; model trouble is
    /// recorded in the report, not raised.
    pub async fn classify(&self, text: &str) -> ClassificationResult {
        let started = Instant::now();

        let pattern = self.engine.classify(text);
        let top_pattern = pattern.iter().map(|h| h.confidence).fold(0.0_f64, f64::max);

        let (model, path, model_error) =
            if top_pattern >= self.config.pattern_match_threshold {
                tracing::debug!(
                    confidence = top_pattern,
                    "pattern path is confident, skipping model"
                );
                (Vec::new(), PathTaken::ShortCircuit, None)
            } else if let Some(adapter) = &self.adapter {
                tracing::debug!(backend = adapter.backend_name(), "escalating to model path");
                match adapter.classify(text, &pattern).await {
                    Ok(hypotheses) => (hypotheses, PathTaken::Escalated, None),
                    Err(e) => {
                        tracing::warn!(error = %e, "model path failed, degrading to pattern output");
                        (Vec::new(), PathTaken::ModelFailed, Some(e.to_string()))
                    }
                }
            } else {
                (Vec::new(), PathTaken::PatternOnly, None)
            };

        let pattern_count = pattern.len();
        let model_count = model.len();
        let intents = merge::merge_and_rank(pattern, model, &self.config);

        let (requires_clarification, clarification_reason) = match intents.first() {
            None => (true, Some(ClarificationReason::NoMatch)),
            Some(top) if top.confidence < self.config.clarification_threshold => {
                (true, Some(ClarificationReason::LowConfidence))
            }
            Some(_) => (false, None),
        };

        let latency_ms = started.elapsed().as_millis() as u64;
        let report = EngineReport::new(path, pattern_count, model_count, model_error, latency_ms);
        tracing::info!(
            request_id = %report.request_id,
            path = %report.path,
            intents = intents.len(),
            latency_ms = report.latency_ms,
            requires_clarification,
            "classification complete"
        );

        ClassificationResult {
            primary_intent: intents.first().map(|h| h.intent),
            intents,
            requires_clarification,
            clarification_reason,
            report,
        }
    }
}
