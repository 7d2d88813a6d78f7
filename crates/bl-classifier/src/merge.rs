//! Hypothesis merge, ranking, and truncation.
//!
//! Both classification paths may argue for the same intent. Merging keeps
//! one hypothesis per intent (the stronger source wins, pattern on ties,
//! entities unioned), ranks the survivors, filters weak secondaries, and
//! caps the list. Weak primaries are never filtered here: they have to
//! survive so the clarification policy can see them.

use std::collections::BTreeMap;

use bl_protocol::{Hypothesis, IntentId, union_entities};

use crate::config::EngineConfig;

/// Union pattern and model hypotheses into one ranked list.
pub(crate) fn merge_and_rank(
    pattern: Vec<Hypothesis>,
    model: Vec<Hypothesis>,
    config: &EngineConfig,
) -> Vec<Hypothesis> {
    let mut by_intent: BTreeMap<IntentId, Hypothesis> = BTreeMap::new();
    for hyp in pattern.into_iter().chain(model) {
        match by_intent.get_mut(&hyp.intent) {
            None => {
                by_intent.insert(hyp.intent, hyp);
            }
            Some(existing) => {
                // Pattern enters first, so on equal confidence the
                // deterministic path keeps the hypothesis.
                if hyp.confidence > existing.confidence {
                    let prior = std::mem::replace(existing, hyp);
                    existing.entities =
                        union_entities(std::mem::take(&mut existing.entities), prior.entities);
                } else {
                    existing.entities =
                        union_entities(std::mem::take(&mut existing.entities), hyp.entities);
                }
            }
        }
    }

    // BTreeMap yields taxonomy order; the stable sort preserves it for
    // equal confidence.
    let mut ranked: Vec<Hypothesis> = by_intent.into_values().collect();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    if !ranked.is_empty() {
        let secondaries = ranked.split_off(1);
        ranked.extend(
            secondaries
                .into_iter()
                .filter(|h| h.confidence >= config.secondary_intent_threshold),
        );
    }
    ranked.truncate(config.max_intents);
    ranked
}
