//! Deterministic classification for the Bookline intent engine.
//!
//! Provides rule packs (builtin table or TOML-loaded) with keyword,
//! co-occurrence, phrase, and regex matchers, quality-scaled scoring, and
//! span-accurate entity extraction for dates, money, service categories,
//! and identifiers. Everything in this crate is synchronous and
//! allocation-light; the async model path lives elsewhere.

pub mod engine;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod pack;

// Re-export key types for convenience
pub use engine::PatternEngine;
pub use error::{RuleError, RuleResult};
pub use extract::EntityExtractor;
pub use matcher::{MatchQuality, Matcher, TextProbe};
pub use pack::{Rule, RuleMatch, RulePack};
