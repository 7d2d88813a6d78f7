//! Money amount scanning.
//!
//! Amounts normalize to a numeric value plus an ISO currency code. Both
//! western (2,500) and Indian (2,50,000) digit grouping are accepted.

use std::sync::LazyLock;

use regex::Regex;

use bl_protocol::{Entity, EntityKind, NormalizedValue, Span};

// Symbol or code before the amount: "₹500", "Rs. 2,500.50", "INR 300", "$20".
// The word-like codes carry their own left boundary; ₹ and $ are symbols
// and need none.
static RE_SYMBOL_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(₹|\$|\b(?:rs\.?|inr|usd))\s*([0-9]+(?:,[0-9]{2,3})*(?:\.[0-9]{1,2})?)")
        .unwrap()
});

// Unit after the amount: "500 rupees", "300 rs", "20 dollars".
static RE_UNIT_AFTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([0-9]+(?:,[0-9]{2,3})*(?:\.[0-9]{1,2})?)\s*(rupees?|rs|inr|dollars?|usd)\b")
        .unwrap()
});

pub(super) fn scan(text: &str, out: &mut Vec<Entity>) {
    for caps in RE_SYMBOL_FIRST.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        push_money(m, &caps[1], &caps[2], out);
    }
    for caps in RE_UNIT_AFTER.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        push_money(m, &caps[2], &caps[1], out);
    }
}

fn push_money(m: regex::Match<'_>, unit: &str, digits: &str, out: &mut Vec<Entity>) {
    let Ok(amount) = digits.replace(',', "").parse::<f64>() else {
        return;
    };
    out.push(
        Entity::new(EntityKind::Currency, m.as_str(), Span::new(m.start(), m.end()))
            .with_normalized(NormalizedValue::Money {
                amount,
                currency: currency_code(unit).into(),
            }),
    );
}

fn currency_code(unit: &str) -> &'static str {
    match unit.trim_end_matches('.').to_ascii_lowercase().as_str() {
        "₹" | "rs" | "inr" | "rupee" | "rupees" => "INR",
        _ => "USD",
    }
}
