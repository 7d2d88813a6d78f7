//! Rule packs: validated, compiled collections of classification rules.
//!
//! A pack is loaded once (builtin table or TOML file), validated and
//! compiled up front, then evaluated per utterance. Validation failures
//! are fatal at load time so a running engine never sees a bad rule.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use bl_protocol::IntentId;

use crate::error::{RuleError, RuleResult};
use crate::matcher::{CompiledMatcher, MatchQuality, Matcher, TextProbe};

/// One deterministic classification rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Stable name, unique within a pack ("refund.keywords").
    pub name: String,
    /// Intent this rule argues for.
    pub intent: IntentId,
    /// Base confidence in (0, 1] when the matcher fires at full quality.
    pub weight: f64,
    /// How the rule matches.
    pub matcher: Matcher,
}

/// One rule that fired against an utterance.
#[derive(Debug, Clone)]
pub struct RuleMatch {
    pub rule: String,
    pub intent: IntentId,
    pub quality: MatchQuality,
    /// Rule weight scaled by match quality.
    pub confidence: f64,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: Rule,
    matcher: CompiledMatcher,
}

/// A named, validated set of rules ready to evaluate.
#[derive(Debug, Clone)]
pub struct RulePack {
    name: String,
    rules: Vec<CompiledRule>,
}

#[derive(Debug, Deserialize)]
struct RulePackFile {
    name: String,
    #[serde(default)]
    rules: Vec<Rule>,
}

impl RulePack {
    /// Validate and compile a set of rules.
    pub fn from_rules(name: impl Into<String>, rules: Vec<Rule>) -> RuleResult<Self> {
        if rules.is_empty() {
            return Err(RuleError::EmptyPack);
        }
        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            if !seen.insert(rule.name.clone()) {
                return Err(RuleError::DuplicateRule(rule.name));
            }
            // NaN fails the range check too.
            if !(rule.weight > 0.0 && rule.weight <= 1.0) {
                return Err(RuleError::Weight {
                    rule: rule.name,
                    weight: rule.weight,
                });
            }
            let matcher = rule.matcher.compile(&rule.name)?;
            compiled.push(CompiledRule { rule, matcher });
        }
        Ok(Self {
            name: name.into(),
            rules: compiled,
        })
    }

    /// Parse a pack from TOML text.
    pub fn from_toml_str(text: &str) -> RuleResult<Self> {
        let file: RulePackFile =
            toml::from_str(text).map_err(|e| RuleError::Parse(e.to_string()))?;
        Self::from_rules(file.name, file.rules)
    }

    /// Load a pack from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> RuleResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| RuleError::Io(e.to_string()))?;
        Self::from_toml_str(&text)
    }

    /// The pack shipped with the engine. The table is known-good, so
    /// compilation cannot fail.
    pub fn builtin() -> Self {
        Self::from_rules("builtin", builtin_rules()).expect("builtin rule pack must compile")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().map(|c| &c.rule)
    }

    /// Run every rule. Returns one entry per rule that applied, in pack order.
    pub fn evaluate(&self, probe: &TextProbe<'_>) -> Vec<RuleMatch> {
        self.rules
            .iter()
            .filter_map(|c| {
                c.matcher.evaluate(probe).map(|quality| RuleMatch {
                    rule: c.rule.name.clone(),
                    intent: c.rule.intent,
                    quality,
                    confidence: quality.apply(c.rule.weight),
                })
            })
            .collect()
    }
}

// ── Builtin rule table ──────────────────────────────────────────

fn any_of(name: &str, intent: IntentId, weight: f64, terms: &[&str]) -> Rule {
    Rule {
        name: name.into(),
        intent,
        weight,
        matcher: Matcher::AnyOf {
            terms: terms.iter().map(|s| s.to_string()).collect(),
        },
    }
}

fn all_of(name: &str, intent: IntentId, weight: f64, terms: &[&str]) -> Rule {
    Rule {
        name: name.into(),
        intent,
        weight,
        matcher: Matcher::AllOf {
            terms: terms.iter().map(|s| s.to_string()).collect(),
        },
    }
}

fn phrase(name: &str, intent: IntentId, weight: f64, phrase: &str) -> Rule {
    Rule {
        name: name.into(),
        intent,
        weight,
        matcher: Matcher::Phrase {
            phrase: phrase.into(),
        },
    }
}

fn pattern(name: &str, intent: IntentId, weight: f64, pattern: &str) -> Rule {
    Rule {
        name: name.into(),
        intent,
        weight,
        matcher: Matcher::Pattern {
            pattern: pattern.into(),
        },
    }
}

/// The shipped rules. Weights reflect how unambiguous the evidence is;
/// bare topic keywords sit low so they surface secondary intents without
/// ever short-circuiting on their own.
fn builtin_rules() -> Vec<Rule> {
    use IntentId::*;

    vec![
        // ── Booking management ──────────────────────────────────
        phrase("booking.cancel_phrase", BookingManagement, 0.9, "cancel my booking"),
        any_of(
            "booking.cancel_terms",
            BookingManagement,
            0.85,
            &[
                "cancel my appointment",
                "cancel the booking",
                "cancel the visit",
                "cancel my visit",
                "call off the",
            ],
        ),
        any_of(
            "booking.reschedule",
            BookingManagement,
            0.85,
            &[
                "reschedule",
                "postpone",
                "prepone",
                "move my appointment",
                "change my booking",
                "change the slot",
                "shift my booking",
            ],
        ),
        any_of(
            "booking.book_request",
            BookingManagement,
            0.8,
            &[
                "book a",
                "book an",
                "book the",
                "make a booking",
                "new booking",
                "schedule a",
                "need an appointment",
                "want an appointment",
                "arrange a visit",
                "send someone",
            ],
        ),
        all_of("booking.cooccur_cancel", BookingManagement, 0.8, &["cancel", "booking"]),
        all_of("booking.cooccur_slot", BookingManagement, 0.75, &["change", "slot"]),
        any_of(
            "booking.keywords",
            BookingManagement,
            0.45,
            &["booking", "appointment", "reservation", "slot"],
        ),
        // ── Refund requests ─────────────────────────────────────
        phrase("refund.phrase", RefundRequest, 0.9, "i want a refund"),
        any_of(
            "refund.keywords",
            RefundRequest,
            0.85,
            &["refund", "money back", "reimburse", "reimbursement"],
        ),
        any_of(
            "refund.request_terms",
            RefundRequest,
            0.85,
            &[
                "want my money",
                "give me back my money",
                "claim a refund",
                "process my refund",
            ],
        ),
        all_of("refund.cooccur", RefundRequest, 0.7, &["return", "money"]),
        // ── Payment issues ──────────────────────────────────────
        any_of(
            "payment.double_charge",
            PaymentIssue,
            0.9,
            &[
                "charged twice",
                "double charged",
                "double charge",
                "charged me twice",
                "duplicate charge",
                "duplicate transaction",
            ],
        ),
        any_of(
            "payment.failed",
            PaymentIssue,
            0.85,
            &[
                "payment failed",
                "transaction failed",
                "card declined",
                "payment declined",
                "payment stuck",
                "payment pending",
                "money deducted",
                "amount deducted",
            ],
        ),
        any_of(
            "payment.keywords",
            PaymentIssue,
            0.8,
            &["overcharged", "billing issue", "billing problem", "wrong amount"],
        ),
        pattern(
            "payment.charged_amount",
            PaymentIssue,
            0.75,
            r"(?i)\bcharged\s+(?:₹|rs\.?\s*|inr\s*)?\d",
        ),
        all_of("payment.cooccur_wrong", PaymentIssue, 0.7, &["wrong", "charge"]),
        // ── Service inquiries ───────────────────────────────────
        any_of(
            "inquiry.price",
            ServiceInquiry,
            0.8,
            &[
                "how much",
                "what is the price",
                "price of",
                "price for",
                "cost of",
                "cost for",
                "charges for",
                "rate card",
                "what do you charge",
            ],
        ),
        any_of(
            "inquiry.offer",
            ServiceInquiry,
            0.8,
            &["do you offer", "do you provide", "do you do", "do you have"],
        ),
        any_of(
            "inquiry.availability",
            ServiceInquiry,
            0.7,
            &[
                "available",
                "availability",
                "earliest slot",
                "working hours",
                "open on",
                "service in my area",
                "serviceable",
            ],
        ),
        all_of("inquiry.cooccur_open", ServiceInquiry, 0.65, &["when", "open"]),
        any_of(
            "inquiry.keywords",
            ServiceInquiry,
            0.5,
            &["services", "pricing", "quote", "estimate"],
        ),
        // ── Complaints ──────────────────────────────────────────
        phrase("complaint.phrase", Complaint, 0.9, "i want to file a complaint"),
        any_of(
            "complaint.direct",
            Complaint,
            0.85,
            &["complaint", "complain", "escalate this", "escalate my"],
        ),
        any_of(
            "complaint.no_show",
            Complaint,
            0.85,
            &[
                "never showed up",
                "did not show up",
                "didn't show up",
                "no one came",
                "nobody came",
                "never arrived",
                "still waiting for the technician",
            ],
        ),
        any_of(
            "complaint.quality",
            Complaint,
            0.8,
            &[
                "terrible",
                "horrible",
                "worst",
                "pathetic",
                "unacceptable",
                "very poor",
                "disappointed",
                "disappointing",
                "not happy with",
                "unhappy with",
                "poor service",
                "bad service",
                "rude",
                "unprofessional",
            ],
        ),
        all_of("complaint.damage", Complaint, 0.8, &["technician", "damaged"]),
        // ── Account updates ─────────────────────────────────────
        any_of(
            "account.contact",
            AccountUpdate,
            0.85,
            &[
                "change my number",
                "change my phone",
                "update my number",
                "update my phone",
                "new phone number",
                "change my email",
                "update my email",
                "change my address",
                "update my address",
                "new address",
            ],
        ),
        any_of(
            "account.profile",
            AccountUpdate,
            0.8,
            &["update my profile", "edit my profile", "update my details", "change my name"],
        ),
        pattern(
            "account.email_pattern",
            AccountUpdate,
            0.85,
            r"(?i)\b(?:change|update)\b.*\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b",
        ),
        all_of("account.cooccur", AccountUpdate, 0.75, &["update", "account"]),
        any_of(
            "account.keywords",
            AccountUpdate,
            0.5,
            &["my account", "my profile", "contact details"],
        ),
    ]
}
