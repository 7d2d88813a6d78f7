//! Identifier scanning: booking references, phone numbers, emails.

use std::sync::LazyLock;

use regex::Regex;

use bl_protocol::{Entity, EntityKind, NormalizedValue, Span};

// "booking BK-10492", "order number 84312", "ref: HS-99104". The span
// covers the identifier itself, not the introducing words.
static RE_CONTEXT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:booking|order|ticket|reference|ref|complaint|request|job)\s*(?:id|number|no\.?|#)?\s*[:#-]?\s*([a-z]{0,4}-?[0-9]{3,12})\b",
    )
    .unwrap()
});

// Standalone structured ids like "BK-10492". Deliberately case-sensitive.
static RE_STRUCTURED_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{2,4}-[0-9]{3,10})\b").unwrap());

// Bare hash references like "#48291"; the hash stays in the span, the
// normalized id drops it.
static RE_HASH_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([0-9]{3,12})\b").unwrap());

// Indian mobile numbers, with or without the country prefix.
static RE_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\+91[\s-]?)?\b[6-9][0-9]{4}[\s-]?[0-9]{5}\b").unwrap());

static RE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b").unwrap()
});

pub(super) fn scan(text: &str, out: &mut Vec<Entity>) {
    for caps in RE_CONTEXT_ID.captures_iter(text) {
        let Some(m) = caps.get(1) else { continue };
        push_reference(m, m.as_str().to_ascii_uppercase(), out);
    }
    for caps in RE_STRUCTURED_ID.captures_iter(text) {
        let Some(m) = caps.get(1) else { continue };
        push_reference(m, m.as_str().to_owned(), out);
    }
    for caps in RE_HASH_ID.captures_iter(text) {
        let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else { continue };
        push_reference(whole, digits.as_str().to_owned(), out);
    }
    for m in RE_PHONE.find_iter(text) {
        let digits: String = m.as_str().chars().filter(char::is_ascii_digit).collect();
        // Drop the 91 country code, keep the 10-digit subscriber number.
        let id = if digits.len() == 12 {
            digits[2..].to_owned()
        } else {
            digits
        };
        push_reference(m, id, out);
    }
    for m in RE_EMAIL.find_iter(text) {
        push_reference(m, m.as_str().to_ascii_lowercase(), out);
    }
}

fn push_reference(m: regex::Match<'_>, id: String, out: &mut Vec<Entity>) {
    out.push(
        Entity::new(EntityKind::Identifier, m.as_str(), Span::new(m.start(), m.end()))
            .with_normalized(NormalizedValue::Reference { id }),
    );
}
