//! Ollama HTTP backend.
//!
//! Talks to a local Ollama server over its chat API (`/api/chat`) with
//! `format: "json"` so the model is steered toward machine-readable
//! output. Failures are returned as typed errors; the adapter decides
//! what to log and how to degrade.

use serde::{Deserialize, Serialize};

use crate::backend::{CompletionBackend, PromptSpec};
use crate::error::{AdapterError, AdapterResult};
use crate::schema::{self, ModelReply};

/// Configuration for the Ollama endpoint.
///
/// Deadlines are not configured here. The adapter enforces them around
/// every backend call, so the HTTP client is built without a timeout.
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaConfig {
    /// Ollama HTTP API base URL.
    #[serde(default = "default_host")]
    pub host: String,
    /// Model to use for classification.
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_host() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "llama3.2:3b".into()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_model(),
        }
    }
}

/// Ollama chat API request body.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    format: &'a str,
    stream: bool,
}

/// A single message in the chat request.
#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Ollama chat API response (only fields we need).
#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Backend that classifies against a local Ollama server.
pub struct OllamaBackend {
    client: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaBackend {
    pub fn new(config: OllamaConfig) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("failed to build reqwest client");
        Self { client, config }
    }
}

#[async_trait::async_trait]
impl CompletionBackend for OllamaBackend {
    async fn complete(&self, spec: PromptSpec<'_>) -> AdapterResult<ModelReply> {
        let url = format!("{}/api/chat", self.config.host);

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: spec.system,
                },
                ChatMessage {
                    role: "user",
                    content: spec.user,
                },
            ],
            format: "json",
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AdapterError::Transport(format!("ollama request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Transport(format!(
                "ollama returned status {status}"
            )));
        }

        let text_body = response
            .text()
            .await
            .map_err(|e| AdapterError::Transport(format!("failed to read ollama response: {e}")))?;

        let chat: ChatResponse = serde_json::from_str(&text_body)
            .map_err(|e| AdapterError::Schema(format!("malformed ollama envelope: {e}")))?;

        let content = chat
            .message
            .ok_or_else(|| AdapterError::Schema("ollama response had no message".into()))?
            .content;

        schema::parse_reply(&content)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Helper: build an Ollama chat response body.
    fn ollama_response(content: &str) -> serde_json::Value {
        serde_json::json!({
            "model": "llama3.2:3b",
            "message": {
                "role": "assistant",
                "content": content
            },
            "done": true
        })
    }

    /// Build an OllamaBackend pointed at the mock server.
    fn backend_for(server: &MockServer) -> OllamaBackend {
        OllamaBackend::new(OllamaConfig {
            host: server.uri(),
            model: "llama3.2:3b".into(),
        })
    }

    fn spec(user: &str) -> PromptSpec<'_> {
        PromptSpec {
            system: "prompt",
            user,
        }
    }

    #[tokio::test]
    async fn complete_parses_reply() {
        let server = MockServer::start().await;
        let body = ollama_response(
            r#"{"intents": [
                {"intent": "booking_management", "confidence": 0.9,
                 "entities": [{"kind": "date_time", "text": "tomorrow"}]},
                {"intent": "refund_request", "confidence": 0.6, "entities": []}
            ]}"#,
        );
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let reply = backend
            .complete(spec("cancel my booking for tomorrow, and refund me"))
            .await
            .expect("should complete successfully");

        assert_eq!(reply.intents.len(), 2);
        assert_eq!(reply.intents[0].intent, "booking_management");
        assert_eq!(reply.intents[0].entities[0].text, "tomorrow");
    }

    #[tokio::test]
    async fn empty_intents_reply_is_ok() {
        let server = MockServer::start().await;
        let body = ollama_response(r#"{"intents": []}"#);
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let reply = backend.complete(spec("what's the weather")).await.unwrap();
        assert!(reply.intents.is_empty(), "no-match is a valid answer, not an error");
    }

    #[tokio::test]
    async fn fenced_reply_still_parses() {
        let server = MockServer::start().await;
        let body = ollama_response(
            "```json\n{\"intents\": [{\"intent\": \"complaint\", \"confidence\": 0.8}]}\n```",
        );
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let reply = backend.complete(spec("the cleaner was rude")).await.unwrap();
        assert_eq!(reply.intents[0].intent, "complaint");
    }

    #[tokio::test]
    async fn non_success_status_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let err = backend.complete(spec("anything")).await.unwrap_err();
        assert!(matches!(err, AdapterError::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn unreachable_host_is_transport() {
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };
        // Server dropped, so the port refuses connections.
        let backend = OllamaBackend::new(OllamaConfig {
            host: uri,
            model: "llama3.2:3b".into(),
        });
        let err = backend.complete(spec("anything")).await.unwrap_err();
        assert!(matches!(err, AdapterError::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn garbage_content_is_schema() {
        let server = MockServer::start().await;
        let body = ollama_response("this is not json at all");
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let err = backend.complete(spec("anything")).await.unwrap_err();
        assert!(matches!(err, AdapterError::Schema(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn missing_message_is_schema() {
        let server = MockServer::start().await;
        let body = serde_json::json!({ "model": "llama3.2:3b", "done": true });
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let err = backend.complete(spec("anything")).await.unwrap_err();
        assert!(matches!(err, AdapterError::Schema(_)), "got {err:?}");
    }

    #[test]
    fn config_defaults() {
        let config = OllamaConfig::default();
        assert_eq!(config.host, "http://localhost:11434");
        assert_eq!(config.model, "llama3.2:3b");
    }

    #[test]
    fn config_from_toml() {
        let toml_str = r#"
host = "http://192.168.1.50:11434"
model = "qwen2.5:7b"
"#;
        let config: OllamaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.host, "http://192.168.1.50:11434");
        assert_eq!(config.model, "qwen2.5:7b");
    }
}
