//! The closed intent taxonomy and per-intent catalog entries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::EntityKind;

/// A customer goal the engine can recognize.
///
/// The taxonomy is closed: every id the engine accepts is declared here, and
/// configuration referencing any other id is rejected at startup. Variant
/// declaration order matters — `#[derive(Ord)]` uses it, and ranking ties are
/// broken by this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentId {
    /// Create, reschedule, cancel, or check a service booking.
    BookingManagement,
    /// Ask for money back on a paid booking.
    RefundRequest,
    /// Failed, stuck, or duplicated payments.
    PaymentIssue,
    /// Questions about the service catalog, prices, or availability.
    ServiceInquiry,
    /// Dissatisfaction with a completed or attempted service.
    Complaint,
    /// Changes to profile data: address, phone, email.
    AccountUpdate,
}

impl IntentId {
    /// All intents in taxonomy declaration order.
    pub const ALL: [IntentId; 6] = [
        IntentId::BookingManagement,
        IntentId::RefundRequest,
        IntentId::PaymentIssue,
        IntentId::ServiceInquiry,
        IntentId::Complaint,
        IntentId::AccountUpdate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BookingManagement => "booking_management",
            Self::RefundRequest => "refund_request",
            Self::PaymentIssue => "payment_issue",
            Self::ServiceInquiry => "service_inquiry",
            Self::Complaint => "complaint",
            Self::AccountUpdate => "account_update",
        }
    }

    /// One-line description, used verbatim in the model prompt.
    pub fn description(&self) -> &'static str {
        match self {
            Self::BookingManagement => {
                "Book a new service visit, or reschedule, cancel, or check an existing booking"
            }
            Self::RefundRequest => "Request a refund or money back for a paid booking",
            Self::PaymentIssue => {
                "Report a payment problem: failed payment, double charge, stuck transaction"
            }
            Self::ServiceInquiry => {
                "Ask what services are offered, what they cost, or when they are available"
            }
            Self::Complaint => "Complain about service quality or a no-show professional",
            Self::AccountUpdate => "Update account details: address, phone number, email",
        }
    }

    /// Entity kinds relevant to this intent (the default entity schema).
    pub fn default_entity_kinds(&self) -> &'static [EntityKind] {
        match self {
            Self::BookingManagement => &[
                EntityKind::DateTime,
                EntityKind::Category,
                EntityKind::Identifier,
            ],
            Self::RefundRequest => &[EntityKind::Currency, EntityKind::Identifier],
            Self::PaymentIssue => &[
                EntityKind::Currency,
                EntityKind::Identifier,
                EntityKind::DateTime,
            ],
            Self::ServiceInquiry => &[EntityKind::Category, EntityKind::DateTime],
            Self::Complaint => &[
                EntityKind::Category,
                EntityKind::Identifier,
                EntityKind::DateTime,
            ],
            Self::AccountUpdate => &[EntityKind::Identifier],
        }
    }
}

impl std::fmt::Display for IntentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a taxonomy id.
#[derive(Debug, Error)]
#[error("unknown intent id: {0}")]
pub struct UnknownIntent(pub String);

impl std::str::FromStr for IntentId {
    type Err = UnknownIntent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntentId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownIntent(s.to_string()))
    }
}

/// Catalog entry for one intent, assembled by the registry at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentDefinition {
    /// Taxonomy id.
    pub id: IntentId,
    /// One-line description (also rendered into the model prompt).
    pub description: String,
    /// Entity kinds the extractor and the model may attach to this intent.
    pub entity_kinds: Vec<EntityKind>,
    /// Multiplier applied to pattern rule weights for this intent.
    pub pattern_bias: f64,
}

impl IntentDefinition {
    /// Build the stock definition for an intent (bias 1.0).
    pub fn stock(id: IntentId) -> Self {
        Self {
            id,
            description: id.description().to_string(),
            entity_kinds: id.default_entity_kinds().to_vec(),
            pattern_bias: 1.0,
        }
    }
}
