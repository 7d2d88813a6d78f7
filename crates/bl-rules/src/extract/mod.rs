//! Entity extraction: deterministic span tagging over the raw utterance.
//!
//! Extraction is scoped by intent: the engine only asks for the entity
//! kinds declared for the intent that matched, so a refund never grows a
//! service-category entity. Overlapping candidates are resolved longest
//! span first ("day after tomorrow" beats the "tomorrow" inside it).

mod category;
mod date_time;
mod money;
mod reference;

use chrono::{DateTime, Utc};

use bl_protocol::{Entity, EntityKind};

/// Deterministic entity extractor.
///
/// Stateless apart from an optional pinned clock for resolving relative
/// date expressions.
#[derive(Debug, Clone, Default)]
pub struct EntityExtractor {
    reference: Option<DateTime<Utc>>,
}

impl EntityExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the clock used to resolve relative date expressions.
    pub fn with_reference(reference: DateTime<Utc>) -> Self {
        Self {
            reference: Some(reference),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.reference.unwrap_or_else(Utc::now)
    }

    /// Scan `text` for the requested entity kinds.
    ///
    /// Returned entities are non-overlapping and ordered by span start.
    pub fn extract(&self, text: &str, kinds: &[EntityKind]) -> Vec<Entity> {
        let mut found = Vec::new();
        for kind in kinds {
            match kind {
                EntityKind::DateTime => date_time::scan(text, self.now(), &mut found),
                EntityKind::Currency => money::scan(text, &mut found),
                EntityKind::Category => category::scan(text, &mut found),
                EntityKind::Identifier => reference::scan(text, &mut found),
            }
        }
        resolve_overlaps(found)
    }
}

/// Keep the longest span out of any overlapping group, then restore
/// utterance order. Ties go to the earlier span, then kind order.
fn resolve_overlaps(mut candidates: Vec<Entity>) -> Vec<Entity> {
    candidates.sort_by(|a, b| {
        b.span
            .len()
            .cmp(&a.span.len())
            .then(a.span.start.cmp(&b.span.start))
            .then(a.kind.cmp(&b.kind))
    });
    let mut kept: Vec<Entity> = Vec::new();
    for cand in candidates {
        if kept.iter().all(|k| !k.span.overlaps(&cand.span)) {
            kept.push(cand);
        }
    }
    kept.sort_by_key(|e| (e.span.start, e.span.end));
    kept
}
