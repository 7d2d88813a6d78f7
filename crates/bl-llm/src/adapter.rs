//! Model classifier adapter.
//!
//! Wraps a [`CompletionBackend`] and turns its raw replies into validated
//! hypotheses: unknown intents are dropped, confidences below the floor
//! are dropped, entity quotes are resolved to byte spans in the input.
//! Every call runs under a deadline; a backend that overruns it is cut
//! off and reported as [`AdapterError::Timeout`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use bl_protocol::{
    Entity, EntityKind, Hypothesis, HypothesisSource, IntentDefinition, IntentId, Span,
};

use crate::backend::{CompletionBackend, PromptSpec};
use crate::error::{AdapterError, AdapterResult};
use crate::prompt;
use crate::schema::ModelEntity;

/// Adapter from a raw completion backend to validated hypotheses.
pub struct ModelAdapter {
    backend: Arc<dyn CompletionBackend>,
    system_prompt: String,
    timeout: Duration,
    min_confidence: f64,
    allowed_kinds: BTreeMap<IntentId, Vec<EntityKind>>,
}

impl ModelAdapter {
    /// Build an adapter for a set of intent definitions.
    ///
    /// The system prompt is rendered once here; the definitions also seed
    /// the per-intent entity kind allowlist used during validation.
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        definitions: &[IntentDefinition],
        timeout: Duration,
        min_confidence: f64,
        max_intents: usize,
    ) -> Self {
        let system_prompt = prompt::system_prompt(definitions, max_intents);
        let allowed_kinds = definitions
            .iter()
            .map(|d| (d.id, d.entity_kinds.clone()))
            .collect();
        Self {
            backend,
            system_prompt,
            timeout,
            min_confidence,
            allowed_kinds,
        }
    }

    /// Backend name for logging and reports.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Classify a message through the model.
    ///
    /// `context` carries the pattern engine's tentative hypotheses; they
    /// ride along in the prompt as hints. `Ok(vec![])` means the model
    /// answered and matched nothing; an `Err` means the call failed and
    /// the caller should degrade to whatever the pattern engine produced.
    pub async fn classify(
        &self,
        text: &str,
        context: &[Hypothesis],
    ) -> AdapterResult<Vec<Hypothesis>> {
        let user = prompt::user_message(text, context);
        let spec = PromptSpec {
            system: &self.system_prompt,
            user: &user,
        };

        let reply = match tokio::time::timeout(self.timeout, self.backend.complete(spec)).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(
                    backend = self.backend.name(),
                    timeout = ?self.timeout,
                    "model call timed out"
                );
                return Err(AdapterError::Timeout(self.timeout));
            }
        };

        // Per-intent max over whatever survives validation. A repeated
        // intent keeps its strongest confidence; entity quotes from every
        // mention are pooled and deduped during resolution.
        let mut best: BTreeMap<IntentId, (f64, Vec<ModelEntity>)> = BTreeMap::new();
        for candidate in reply.intents {
            let Ok(intent) = candidate.intent.parse::<IntentId>() else {
                tracing::warn!(intent = %candidate.intent, "model returned unknown intent");
                continue;
            };
            if !self.allowed_kinds.contains_key(&intent) {
                tracing::warn!(intent = %intent, "model returned unconfigured intent");
                continue;
            }
            // Negated form so a NaN confidence is dropped too.
            if !(candidate.confidence >= self.min_confidence) {
                tracing::debug!(
                    intent = %intent,
                    confidence = candidate.confidence,
                    "model confidence below threshold"
                );
                continue;
            }
            match best.get_mut(&intent) {
                Some((cur, entities)) => {
                    *cur = cur.max(candidate.confidence);
                    entities.extend(candidate.entities);
                }
                None => {
                    best.insert(intent, (candidate.confidence, candidate.entities));
                }
            }
        }

        let hypotheses = best
            .into_iter()
            .map(|(intent, (confidence, entities))| {
                let entities = self.resolve_entities(intent, text, entities);
                Hypothesis::new(intent, confidence, HypothesisSource::Model)
                    .with_entities(entities)
            })
            .collect();
        Ok(hypotheses)
    }

    /// Resolve model entity quotes against the input text.
    ///
    /// The model quotes text instead of addressing it by offset, because
    /// models are unreliable with byte positions. Quotes that cannot be
    /// found in the input, and kinds the intent does not declare, are
    /// dropped.
    fn resolve_entities(
        &self,
        intent: IntentId,
        text: &str,
        raw: Vec<ModelEntity>,
    ) -> Vec<Entity> {
        let allowed = self.allowed_kinds.get(&intent);
        let mut entities: Vec<Entity> = Vec::new();
        for me in raw {
            let Ok(kind) = me.kind.parse::<EntityKind>() else {
                tracing::debug!(kind = %me.kind, "model returned unknown entity kind");
                continue;
            };
            if let Some(allowed) = allowed
                && !allowed.contains(&kind)
            {
                tracing::debug!(
                    intent = %intent,
                    kind = %kind,
                    "entity kind not declared for intent"
                );
                continue;
            }
            let Some(span) = locate(text, &me.text) else {
                tracing::debug!(quote = %me.text, "model quote not found in input");
                continue;
            };
            entities.push(Entity::new(kind, &text[span.start..span.end], span));
        }
        entities.sort_by_key(|e| (e.span.start, e.span.end, e.kind));
        entities.dedup_by(|a, b| a.kind == b.kind && a.span == b.span);
        entities
    }
}

/// Find a quote in the input, first verbatim, then ASCII-case-insensitively.
///
/// Lowercasing is ASCII-only so byte offsets in the lowered copy are valid
/// in the original.
fn locate(haystack: &str, quote: &str) -> Option<Span> {
    if quote.is_empty() {
        return None;
    }
    let start = haystack.find(quote).or_else(|| {
        haystack
            .to_ascii_lowercase()
            .find(&quote.to_ascii_lowercase())
    })?;
    Some(Span::new(start, start + quote.len()))
}
