//! The JSON contract between the adapter and the model.
//!
//! Ids and entity kinds arrive as raw strings; validation against the
//! taxonomy happens in the adapter, not here.

use serde::Deserialize;

use crate::error::{AdapterError, AdapterResult};

/// Root object the model must return.
///
/// An empty `intents` array is a real answer ("nothing matches"), distinct
/// from a malformed reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelReply {
    #[serde(default)]
    pub intents: Vec<ModelIntent>,
}

/// One intent the model proposes.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelIntent {
    pub intent: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub entities: Vec<ModelEntity>,
}

/// One entity mention, quoted from the message rather than addressed by
/// offset — models are unreliable with byte positions.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntity {
    pub kind: String,
    pub text: String,
}

/// Parse the model's text output, tolerating markdown code fences.
pub fn parse_reply(raw: &str) -> AdapterResult<ModelReply> {
    let json = extract_json(raw);
    serde_json::from_str(json)
        .map_err(|e| AdapterError::Schema(format!("failed to parse model JSON: {e}; raw: {raw}")))
}

/// Extract JSON from model output that may be wrapped in markdown code blocks.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    // Try ```json ... ``` first
    if let Some(start) = trimmed.find("```json") {
        let after_fence = &trimmed[start + 7..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    // Try ``` ... ```
    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    // Assume raw JSON
    trimmed
}
