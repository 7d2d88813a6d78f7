//! Shared test harness for E2E integration tests.
//!
//! Wires config, rule pack, and a model backend into a full `Classifier`
//! the same way the binary does, exercising real code paths across all
//! crate boundaries.

use std::sync::Arc;

use bl_classifier::{Classifier, EngineConfig};
use bl_llm::{MockBackend, ModelEntity, ModelIntent, ModelReply, OllamaBackend, OllamaConfig};
use bl_protocol::ClassificationResult;
use bl_rules::RulePack;

/// End-to-end harness: a fully wired classifier plus a handle on the mock
/// model backend so tests can assert whether and how the model was consulted.
pub struct TestHarness {
    /// Classifier under test.
    pub classifier: Classifier,
    /// Shared mock backend; counts calls and records prompts.
    pub model: Arc<MockBackend>,
}

impl TestHarness {
    /// Default thresholds, builtin rule pack, the given mock backend.
    pub fn with_model(mock: MockBackend) -> Self {
        Self::build(EngineConfig::default(), RulePack::builtin(), mock)
    }

    /// Full control over config and pack.
    pub fn build(config: EngineConfig, pack: RulePack, mock: MockBackend) -> Self {
        let model = Arc::new(mock);
        let classifier =
            Classifier::new(config, pack, Some(model.clone())).expect("harness config must validate");
        Self { classifier, model }
    }

    /// Classify one utterance through the full engine.
    pub async fn classify(&self, text: &str) -> ClassificationResult {
        self.classifier.classify(text).await
    }
}

/// A classifier with no model backend at all (pattern-only mode).
pub fn pattern_only() -> Classifier {
    Classifier::new(EngineConfig::default(), RulePack::builtin(), None)
        .expect("default config must validate")
}

/// A classifier whose model path talks to an Ollama server at `host`.
pub fn ollama_classifier(host: &str) -> Classifier {
    let backend = OllamaBackend::new(OllamaConfig {
        host: host.to_string(),
        model: "llama3.2:3b".into(),
    });
    Classifier::new(
        EngineConfig::default(),
        RulePack::builtin(),
        Some(Arc::new(backend)),
    )
    .expect("default config must validate")
}

/// Build a model reply from (intent, confidence) pairs, no entities.
pub fn reply(intents: &[(&str, f64)]) -> ModelReply {
    ModelReply {
        intents: intents
            .iter()
            .map(|(intent, confidence)| ModelIntent {
                intent: (*intent).to_string(),
                confidence: *confidence,
                entities: Vec::new(),
            })
            .collect(),
    }
}

/// Build one model intent carrying quoted (kind, text) entities.
pub fn intent_with_entities(
    intent: &str,
    confidence: f64,
    entities: &[(&str, &str)],
) -> ModelIntent {
    ModelIntent {
        intent: intent.to_string(),
        confidence,
        entities: entities
            .iter()
            .map(|(kind, text)| ModelEntity {
                kind: (*kind).to_string(),
                text: (*text).to_string(),
            })
            .collect(),
    }
}

/// Chat response envelope a wiremock server serves for a canned Ollama reply.
pub fn ollama_response(content: &str) -> serde_json::Value {
    serde_json::json!({
        "model": "llama3.2:3b",
        "message": {
            "role": "assistant",
            "content": content
        },
        "done": true
    })
}
