//! Mock completion backend for testing without a running Ollama server.
//!
//! Serves queued replies in FIFO order and records every call for
//! assertion in tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::backend::{CompletionBackend, PromptSpec};
use crate::error::{AdapterError, AdapterResult};
use crate::schema::ModelReply;

/// A recorded completion call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub user: String,
}

/// Mock implementation of the `CompletionBackend` trait.
///
/// Stores calls in memory for test verification. Thread-safe via `Mutex`
/// (fine for test contexts). An exhausted reply queue answers with an
/// empty reply, the model's way of saying nothing matched.
pub struct MockBackend {
    replies: Mutex<VecDeque<AdapterResult<ModelReply>>>,
    seen: Mutex<Vec<RecordedCall>>,
    delay: Option<Duration>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            seen: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Queue a successful reply. Replies are served in the order queued.
    pub fn with_reply(self, reply: ModelReply) -> Self {
        self.replies.lock().unwrap().push_back(Ok(reply));
        self
    }

    /// Queue a failure.
    pub fn with_error(self, error: AdapterError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    /// Sleep this long before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of completion calls made so far.
    ///
    /// Calls are counted on entry, so a call cut off by the adapter's
    /// deadline still counts.
    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Get all recorded calls.
    pub fn seen(&self) -> Vec<RecordedCall> {
        self.seen.lock().unwrap().clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(&self, spec: PromptSpec<'_>) -> AdapterResult<ModelReply> {
        self.seen.lock().unwrap().push(RecordedCall {
            system: spec.system.to_string(),
            user: spec.user.to_string(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ModelReply::default()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
