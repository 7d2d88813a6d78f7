//! Hypotheses and the canonical classification result.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::report::EngineReport;
use crate::taxonomy::IntentId;

/// Which classification path produced a hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HypothesisSource {
    /// Deterministic pattern engine.
    Pattern,
    /// Model classifier adapter.
    Model,
}

impl HypothesisSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Model => "model",
        }
    }
}

impl std::fmt::Display for HypothesisSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate (intent, confidence, entities) from a single path.
///
/// Created per attempt, never mutated afterwards; merging consumes
/// hypotheses and produces new ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    /// Taxonomy id.
    pub intent: IntentId,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Path that produced this candidate.
    pub source: HypothesisSource,
    /// Entities attached to this intent, in span order.
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl Hypothesis {
    /// Build a hypothesis, clamping confidence into [0, 1].
    pub fn new(intent: IntentId, confidence: f64, source: HypothesisSource) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            intent,
            confidence,
            source,
            entities: Vec::new(),
        }
    }

    pub fn with_entities(mut self, entities: Vec<Entity>) -> Self {
        self.entities = entities;
        self
    }
}

/// Why the caller should ask a follow-up question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClarificationReason {
    /// No path produced any hypothesis.
    NoMatch,
    /// The best hypothesis is below the clarification threshold.
    LowConfidence,
}

impl ClarificationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoMatch => "no_match",
            Self::LowConfidence => "low_confidence",
        }
    }
}

impl std::fmt::Display for ClarificationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical immutable output of one classification request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Ranked hypotheses: descending confidence, ties broken by taxonomy
    /// declaration order. At most `max_intents` entries, one per intent id.
    pub intents: Vec<Hypothesis>,
    /// Intent of the first ranked hypothesis, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_intent: Option<IntentId>,
    /// Whether the caller should ask a follow-up instead of acting.
    pub requires_clarification: bool,
    /// Set when `requires_clarification` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clarification_reason: Option<ClarificationReason>,
    /// Per-request observability record.
    pub report: EngineReport,
}
