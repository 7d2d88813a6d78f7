//! Model classifier adapter for the Bookline intent engine.
//!
//! Provides the escalation half of the engine: when pattern rules are not
//! confident enough, the orchestrator sends the message to a language
//! model through this crate.
//! - `CompletionBackend` trait for model providers (mockable in tests)
//! - `OllamaBackend` for a local Ollama server
//! - `MockBackend` for testing without a model
//! - `ModelAdapter` wrapping any backend with deadlines, taxonomy
//!   validation, and entity span resolution

pub mod adapter;
pub mod backend;
pub mod error;
pub mod mock;
pub mod ollama;
pub mod prompt;
pub mod schema;

// Re-exports for convenience.
pub use adapter::ModelAdapter;
pub use backend::{CompletionBackend, PromptSpec};
pub use error::{AdapterError, AdapterResult};
pub use mock::MockBackend;
pub use ollama::{OllamaBackend, OllamaConfig};
pub use schema::{ModelEntity, ModelIntent, ModelReply};
