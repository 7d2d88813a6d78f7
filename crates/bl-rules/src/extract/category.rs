//! Service category scanning.
//!
//! Surface forms map to canonical category ids. Matching is a word-aligned
//! substring search; the final word is consumed whole so "sofa clean"
//! tags all of "sofa cleaning".

use bl_protocol::{Entity, EntityKind, NormalizedValue, Span};

/// Canonical category ids and the surface forms that map to them.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "ac_service",
        &["ac service", "ac servicing", "ac repair", "air conditioner", "air conditioning"],
    ),
    (
        "plumbing",
        &["plumbing", "plumber", "pipe leak", "leaking tap", "tap repair", "drain block", "water leak"],
    ),
    (
        "electrical",
        &["electrical", "electrician", "wiring", "short circuit", "fan repair", "switchboard", "power socket"],
    ),
    (
        "cleaning",
        &["cleaning", "deep clean", "house clean", "sofa clean", "bathroom clean", "kitchen clean"],
    ),
    (
        "appliance_repair",
        &["appliance", "fridge", "refrigerator", "washing machine", "microwave"],
    ),
    (
        "pest_control",
        &["pest control", "cockroach", "termite", "bed bug", "fumigation"],
    ),
    (
        "carpentry",
        &["carpenter", "carpentry", "furniture repair", "door hinge"],
    ),
    ("painting", &["painting", "painter", "wall paint", "repaint"]),
    ("salon", &["salon", "haircut", "beautician", "massage"]),
];

pub(super) fn scan(text: &str, out: &mut Vec<Entity>) {
    // ASCII lowercasing preserves byte offsets, so spans index into the
    // raw text directly.
    let lowered = text.to_ascii_lowercase();
    for (id, synonyms) in CATEGORIES {
        for synonym in *synonyms {
            for span in find_spans(&lowered, synonym) {
                out.push(
                    Entity::new(EntityKind::Category, &text[span.start..span.end], span)
                        .with_normalized(NormalizedValue::Category { id: (*id).into() }),
                );
            }
        }
    }
}

/// All occurrences of `term` that start on a word boundary, each span
/// extended through the rest of its final word.
fn find_spans(lowered: &str, term: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut from = 0;
    while let Some(pos) = lowered[from..].find(term) {
        let at = from + pos;
        let on_boundary = !lowered[..at]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_alphanumeric());
        if on_boundary {
            let tail: usize = lowered[at + term.len()..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .map(|c| c.len_utf8())
                .sum();
            let end = at + term.len() + tail;
            spans.push(Span::new(at, end));
            from = end;
        } else {
            from = at
                + lowered[at..]
                    .chars()
                    .next()
                    .map_or(1, |c| c.len_utf8());
        }
    }
    spans
}
