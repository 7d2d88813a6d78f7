//! The seam between the adapter and concrete model providers.

use async_trait::async_trait;

use crate::error::AdapterResult;
use crate::schema::ModelReply;

/// One completion request: the fixed system prompt plus the rendered
/// per-request user message.
#[derive(Debug, Clone, Copy)]
pub struct PromptSpec<'a> {
    pub system: &'a str,
    pub user: &'a str,
}

/// A completion capability that can answer one classification prompt.
///
/// Implementations return the reply as the model produced it; taxonomy
/// validation and span resolution happen in the adapter. The adapter also
/// enforces the deadline, so a backend may block for as long as its
/// transport does.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, spec: PromptSpec<'_>) -> AdapterResult<ModelReply>;

    /// Backend name for logging and reports.
    fn name(&self) -> &str;
}
