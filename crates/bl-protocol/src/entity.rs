//! Typed entities extracted from utterance text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of entity types the engine extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Dates, weekdays, relative days, clock times.
    DateTime,
    /// Monetary amounts with a currency.
    Currency,
    /// Service catalog category (ac_service, cleaning, ...).
    Category,
    /// Booking / order references (e.g. "BL-48291").
    Identifier,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DateTime => "date_time",
            Self::Currency => "currency",
            Self::Category => "category",
            Self::Identifier => "identifier",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not an entity kind.
#[derive(Debug, Error)]
#[error("unknown entity kind: {0}")]
pub struct UnknownEntityKind(pub String);

impl std::str::FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date_time" => Ok(Self::DateTime),
            "currency" => Ok(Self::Currency),
            "category" => Ok(Self::Category),
            "identifier" => Ok(Self::Identifier),
            other => Err(UnknownEntityKind(other.to_string())),
        }
    }
}

/// Byte range into the original utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether this span is a valid char-aligned slice of `text`.
    pub fn is_valid_for(&self, text: &str) -> bool {
        !self.is_empty()
            && self.end <= text.len()
            && text.is_char_boundary(self.start)
            && text.is_char_boundary(self.end)
    }

    /// Whether two spans cover any common byte.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Canonical value behind an extracted span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NormalizedValue {
    /// Resolved point in time (dates resolve to midnight UTC).
    Timestamp { at: DateTime<Utc> },
    /// Monetary amount with ISO-ish currency code.
    Money { amount: f64, currency: String },
    /// Canonical service category id.
    Category { id: String },
    /// Uppercased booking / order reference.
    Reference { id: String },
}

/// A typed value extracted from the utterance, owned by one hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity type.
    pub kind: EntityKind,
    /// Verbatim matched text.
    pub text: String,
    /// Byte span into the original utterance.
    pub span: Span,
    /// Canonical value, when normalization succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<NormalizedValue>,
}

impl Entity {
    pub fn new(kind: EntityKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            normalized: None,
        }
    }

    pub fn with_normalized(mut self, value: NormalizedValue) -> Self {
        self.normalized = Some(value);
        self
    }
}

/// Union two entity lists, primary first, deduped by (kind, span).
///
/// Used when hypotheses for the same intent merge: the winning hypothesis
/// keeps its entities and gains whatever the losing one saw elsewhere in
/// the text.
pub fn union_entities(primary: Vec<Entity>, secondary: Vec<Entity>) -> Vec<Entity> {
    let mut out = primary;
    for entity in secondary {
        let duplicate = out
            .iter()
            .any(|held| held.kind == entity.kind && held.span == entity.span);
        if !duplicate {
            out.push(entity);
        }
    }
    out
}
