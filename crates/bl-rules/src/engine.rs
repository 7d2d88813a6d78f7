//! Pattern engine: evaluates a rule pack and folds matches per intent.

use std::collections::BTreeMap;

use tracing::debug;

use bl_protocol::{EntityKind, Hypothesis, HypothesisSource, IntentDefinition, IntentId};

use crate::extract::EntityExtractor;
use crate::matcher::TextProbe;
use crate::pack::{RuleMatch, RulePack};

/// Deterministic classification path: a rule pack plus entity extraction,
/// scoped and biased by the intent definitions it was built with.
pub struct PatternEngine {
    pack: RulePack,
    extractor: EntityExtractor,
    bias: BTreeMap<IntentId, f64>,
    kinds: BTreeMap<IntentId, Vec<EntityKind>>,
}

impl PatternEngine {
    pub fn new(pack: RulePack, definitions: &[IntentDefinition]) -> Self {
        let mut bias = BTreeMap::new();
        let mut kinds = BTreeMap::new();
        for def in definitions {
            bias.insert(def.id, def.pattern_bias);
            kinds.insert(def.id, def.entity_kinds.clone());
        }
        Self {
            pack,
            extractor: EntityExtractor::new(),
            bias,
            kinds,
        }
    }

    /// Swap the extractor, e.g. for a pinned clock.
    pub fn with_extractor(mut self, extractor: EntityExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn pack(&self) -> &RulePack {
        &self.pack
    }

    /// Classify one utterance.
    ///
    /// Produces at most one hypothesis per intent; its confidence is the
    /// best single rule for that intent, never a sum, so stacking weak
    /// rules cannot fake certainty. Output is in taxonomy order.
    pub fn classify(&self, text: &str) -> Vec<Hypothesis> {
        let probe = TextProbe::new(text);
        let mut best: BTreeMap<IntentId, RuleMatch> = BTreeMap::new();
        for m in self.pack.evaluate(&probe) {
            match best.get(&m.intent) {
                Some(cur) if cur.confidence >= m.confidence => {}
                _ => {
                    best.insert(m.intent, m);
                }
            }
        }
        if best.is_empty() {
            debug!(pack = self.pack.name(), "no pattern rules fired");
            return Vec::new();
        }

        best.into_values()
            .map(|m| {
                let bias = self.bias.get(&m.intent).copied().unwrap_or(1.0);
                let confidence = (m.confidence * bias).clamp(0.0, 1.0);
                debug!(
                    rule = m.rule.as_str(),
                    intent = %m.intent,
                    quality = %m.quality,
                    confidence,
                    "pattern rule fired"
                );
                let entities = match self.kinds.get(&m.intent) {
                    Some(kinds) => self.extractor.extract(text, kinds),
                    None => self.extractor.extract(text, m.intent.default_entity_kinds()),
                };
                Hypothesis::new(m.intent, confidence, HypothesisSource::Pattern)
                    .with_entities(entities)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::Matcher;
    use crate::pack::Rule;

    fn stock_definitions() -> Vec<IntentDefinition> {
        IntentId::ALL.iter().map(|id| IntentDefinition::stock(*id)).collect()
    }

    fn rule(name: &str, intent: IntentId, weight: f64, terms: &[&str]) -> Rule {
        Rule {
            name: name.into(),
            intent,
            weight,
            matcher: Matcher::AnyOf {
                terms: terms.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    fn engine(rules: Vec<Rule>) -> PatternEngine {
        let pack = RulePack::from_rules("test", rules).unwrap();
        PatternEngine::new(pack, &stock_definitions())
    }

    #[test]
    fn per_intent_confidence_is_max_not_sum() {
        let engine = engine(vec![
            rule("weak", IntentId::RefundRequest, 0.5, &["refund"]),
            rule("strong", IntentId::RefundRequest, 0.8, &["money back"]),
        ]);
        let hyps = engine.classify("refund my money back");
        assert_eq!(hyps.len(), 1);
        assert!((hyps[0].confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn multiple_intents_each_get_a_hypothesis() {
        let engine = PatternEngine::new(RulePack::builtin(), &stock_definitions());
        let hyps = engine.classify("I was charged twice and I want a refund");
        let intents: Vec<IntentId> = hyps.iter().map(|h| h.intent).collect();
        assert!(intents.contains(&IntentId::PaymentIssue));
        assert!(intents.contains(&IntentId::RefundRequest));
        // Taxonomy order, not score order; ranking happens downstream.
        let mut sorted = intents.clone();
        sorted.sort();
        assert_eq!(intents, sorted);
    }

    #[test]
    fn pattern_bias_scales_and_clamps() {
        let mut defs = stock_definitions();
        for def in &mut defs {
            if def.id == IntentId::Complaint {
                def.pattern_bias = 1.5;
            }
        }
        let pack = RulePack::from_rules(
            "test",
            vec![
                rule("c", IntentId::Complaint, 0.5, &["awful"]),
                rule("c2", IntentId::Complaint, 0.9, &["terrible"]),
            ],
        )
        .unwrap();
        let engine = PatternEngine::new(pack, &defs);

        let hyps = engine.classify("this is awful");
        assert!((hyps[0].confidence - 0.75).abs() < 1e-9);

        // 0.9 * 1.5 clamps to the confidence ceiling.
        let hyps = engine.classify("this is terrible");
        assert!((hyps[0].confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn entities_are_scoped_to_intent_kinds() {
        let engine = PatternEngine::new(RulePack::builtin(), &stock_definitions());
        // Refunds carry currency and identifier kinds, never date_time.
        let hyps = engine.classify("refund my ₹500 for booking BK-1042 from yesterday");
        let refund = hyps
            .iter()
            .find(|h| h.intent == IntentId::RefundRequest)
            .unwrap();
        assert!(refund.entities.iter().any(|e| e.kind == EntityKind::Currency));
        assert!(refund.entities.iter().any(|e| e.kind == EntityKind::Identifier));
        assert!(refund.entities.iter().all(|e| e.kind != EntityKind::DateTime));
    }

    #[test]
    fn unmatched_text_yields_nothing() {
        let engine = PatternEngine::new(RulePack::builtin(), &stock_definitions());
        assert!(engine.classify("what time is it in tokyo").is_empty());
    }

    #[test]
    fn contained_phrase_scores_full_rule_weight() {
        let engine = PatternEngine::new(RulePack::builtin(), &stock_definitions());
        let hyps = engine.classify("Cancel my booking for tomorrow");
        let booking = hyps
            .iter()
            .find(|h| h.intent == IntentId::BookingManagement)
            .unwrap();
        assert!((booking.confidence - 0.9).abs() < 1e-9);
        assert!(booking.entities.iter().any(|e| e.text == "tomorrow"));
    }
}
