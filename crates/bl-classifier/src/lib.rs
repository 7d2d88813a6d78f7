//! Classification orchestrator for the Bookline intent engine.
//!
//! Ties the deterministic pattern path (`bl-rules`) and the model path
//! (`bl-llm`) into one `classify` operation:
//! - `EngineConfig` — thresholds and model settings, validated at startup
//! - `IntentRegistry` — the taxonomy catalog with per-intent bias overlays
//! - `Classifier` — the escalation state machine, merge/rank, and the
//!   clarification policy
//!
//! Setup can fail; classification cannot. Every runtime failure degrades
//! to a pattern-only result carrying an `EngineReport` that says so.

pub mod config;
pub mod error;
mod merge;
pub mod orchestrator;
pub mod registry;

// Re-exports for convenience.
pub use config::{EngineConfig, ModelConfig};
pub use error::{ConfigError, ConfigResult};
pub use orchestrator::Classifier;
pub use registry::IntentRegistry;
