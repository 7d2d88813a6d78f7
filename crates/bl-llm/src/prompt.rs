//! Prompt construction.
//!
//! The system prompt is rendered once from the intent definitions the
//! engine was configured with, so the model only ever sees intents the
//! registry accepts. The user message is rendered per request and carries
//! the pattern engine's tentative matches as hints.

use std::fmt::Write as _;

use bl_protocol::{Hypothesis, IntentDefinition};

/// Render the system prompt for a set of intent definitions.
pub fn system_prompt(definitions: &[IntentDefinition], max_intents: usize) -> String {
    let mut out = String::with_capacity(2048);
    let _ = writeln!(
        out,
        "You classify customer messages for a home-services booking assistant.\n\
         Identify every intent expressed in the message. A message may carry\n\
         more than one intent; list at most {max_intents}, strongest first.\n\n\
         Known intents:"
    );

    for (idx, def) in definitions.iter().enumerate() {
        let _ = writeln!(out, "{}. {} - {}", idx + 1, def.id.as_str(), def.description);
        if !def.entity_kinds.is_empty() {
            let kinds: Vec<&str> = def.entity_kinds.iter().map(|k| k.as_str()).collect();
            let _ = writeln!(out, "   entities: {}", kinds.join(", "));
        }
    }

    out.push_str(
        "\nRespond with JSON only, no prose, in exactly this shape:\n\
         {\"intents\": [{\"intent\": \"<intent id>\", \"confidence\": <0.0-1.0>, \
         \"entities\": [{\"kind\": \"<entity kind>\", \"text\": \"<exact quote from the message>\"}]}]}\n\n\
         Rules:\n\
         - Use only the intent ids and entity kinds listed above.\n\
         - Quote entity text verbatim from the message.\n\
         - Confidence reflects how clearly the message expresses the intent.\n\
         - If no known intent applies, respond with {\"intents\": []}.\n\n\
         Examples:\n\
         Message: \"I want to cancel my cleaning booking for tomorrow\"\n\
         {\"intents\": [{\"intent\": \"booking_management\", \"confidence\": 0.95, \
         \"entities\": [{\"kind\": \"category\", \"text\": \"cleaning\"}, \
         {\"kind\": \"date_time\", \"text\": \"tomorrow\"}]}]}\n\
         Message: \"I was charged twice, I want my money back\"\n\
         {\"intents\": [{\"intent\": \"payment_issue\", \"confidence\": 0.9, \"entities\": []}, \
         {\"intent\": \"refund_request\", \"confidence\": 0.85, \"entities\": []}]}\n\
         Message: \"what's the weather like\"\n\
         {\"intents\": []}\n",
    );

    out
}

/// Render the per-request user message.
///
/// Pattern hypotheses ride along as hints. They come after the message so
/// the model reads and quotes from the customer's words first.
pub fn user_message(text: &str, context: &[Hypothesis]) -> String {
    if context.is_empty() {
        return text.to_string();
    }
    let hints: Vec<String> = context
        .iter()
        .map(|h| format!("{} ({:.2})", h.intent, h.confidence))
        .collect();
    format!(
        "{text}\n\nDeterministic rules tentatively matched: {}. \
         Weigh them as hints, not ground truth.",
        hints.join(", ")
    )
}
