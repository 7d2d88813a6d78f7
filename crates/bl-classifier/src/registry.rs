//! Intent registry: the validated catalog the engine runs on.
//!
//! The taxonomy itself is closed (it lives in `bl-protocol`); the registry
//! pins down the per-deployment pieces — pattern bias overlays — and
//! rejects anything that does not line up, before a single request runs.

use std::collections::BTreeMap;

use bl_protocol::{EntityKind, IntentDefinition, IntentId};

use crate::error::{ConfigError, ConfigResult};

/// Immutable catalog of intent definitions in taxonomy order.
pub struct IntentRegistry {
    definitions: Vec<IntentDefinition>,
}

impl IntentRegistry {
    /// Stock taxonomy with neutral pattern bias everywhere.
    pub fn with_defaults() -> Self {
        Self {
            definitions: IntentId::ALL
                .iter()
                .map(|id| IntentDefinition::stock(*id))
                .collect(),
        }
    }

    /// Stock taxonomy with a per-intent pattern bias overlay applied.
    ///
    /// Overlay ids and bias ranges are checked here, at startup. A biased
    /// rule score is still clamped into [0, 1] at evaluation time.
    pub fn with_bias(overlay: &BTreeMap<String, f64>) -> ConfigResult<Self> {
        let mut registry = Self::with_defaults();
        for (name, bias) in overlay {
            let id: IntentId = name
                .parse()
                .map_err(|_| ConfigError::UnknownIntent(name.clone()))?;
            if !(*bias > 0.0 && *bias <= 2.0) {
                return Err(ConfigError::Bias {
                    intent: name.clone(),
                    bias: *bias,
                });
            }
            registry.definitions[id as usize].pattern_bias = *bias;
        }
        Ok(registry)
    }

    /// Definitions in taxonomy order.
    pub fn definitions(&self) -> &[IntentDefinition] {
        &self.definitions
    }

    /// Look up one definition. The taxonomy is closed, so every id
    /// resolves; definitions are stored in declaration order, so the
    /// discriminant indexes directly.
    pub fn get(&self, id: IntentId) -> &IntentDefinition {
        &self.definitions[id as usize]
    }

    /// Entity kinds declared relevant for an intent.
    pub fn entity_kinds(&self, id: IntentId) -> &[EntityKind] {
        &self.get(id).entity_kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_whole_taxonomy_in_order() {
        let registry = IntentRegistry::with_defaults();
        let ids: Vec<IntentId> = registry.definitions().iter().map(|d| d.id).collect();
        assert_eq!(ids, IntentId::ALL.to_vec());
        assert!(registry
            .definitions()
            .iter()
            .all(|d| (d.pattern_bias - 1.0).abs() < f64::EPSILON));
    }

    #[test]
    fn get_indexes_by_taxonomy_position() {
        let registry = IntentRegistry::with_defaults();
        assert_eq!(registry.get(IntentId::Complaint).id, IntentId::Complaint);
        assert!(registry
            .entity_kinds(IntentId::RefundRequest)
            .contains(&EntityKind::Currency));
    }

    #[test]
    fn bias_overlay_applies_to_named_intent_only() {
        let overlay = BTreeMap::from([("complaint".to_string(), 1.5)]);
        let registry = IntentRegistry::with_bias(&overlay).unwrap();
        assert!((registry.get(IntentId::Complaint).pattern_bias - 1.5).abs() < f64::EPSILON);
        assert!((registry.get(IntentId::RefundRequest).pattern_bias - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_overlay_id_rejected() {
        let overlay = BTreeMap::from([("teleportation".to_string(), 1.2)]);
        assert!(matches!(
            IntentRegistry::with_bias(&overlay),
            Err(ConfigError::UnknownIntent(name)) if name == "teleportation"
        ));
    }

    #[test]
    fn out_of_range_bias_rejected() {
        for bias in [0.0, -1.0, 2.5, f64::NAN] {
            let overlay = BTreeMap::from([("complaint".to_string(), bias)]);
            assert!(
                matches!(IntentRegistry::with_bias(&overlay), Err(ConfigError::Bias { .. })),
                "bias {bias} should be rejected"
            );
        }
    }
}
