use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::LlmError;

use super::{LlmClient, LlmHealth};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    message: Option<ResponseMessage>,
    /// `/api/generate`-style servers answer with a flat `response` field
    response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Client for an Ollama-compatible server
#[derive(Clone)]
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn lists_model(&self, tags: &TagsResponse) -> bool {
        tags.models.iter().any(|m| {
            m.name == self.model
                || (!self.model.contains(':') && m.name == format!("{}:latest", self.model))
        })
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: prompt },
            ],
            stream: false,
        };

        let response = self
            .http
            .post(self.endpoint("/api/chat"))
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let text = parsed
            .message
            .map(|m| m.content)
            .or(parsed.response)
            .ok_or_else(|| LlmError::InvalidResponse("response carried no message".into()))?;

        Ok(text.trim().to_string())
    }

    async fn health(&self) -> LlmHealth {
        let response = match self.http.get(self.endpoint("/api/tags")).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::warn!(status = %r.status(), "LLM health check returned an error status");
                return LlmHealth::Unreachable;
            }
            Err(e) => {
                tracing::warn!(error = %e, "LLM health check failed");
                return LlmHealth::Unreachable;
            }
        };

        match response.json::<TagsResponse>().await {
            Ok(tags) if self.lists_model(&tags) => LlmHealth::Healthy,
            Ok(_) => LlmHealth::ModelMissing,
            Err(e) => {
                tracing::warn!(error = %e, "LLM health check returned an unreadable model list");
                LlmHealth::Unreachable
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer, model: &str) -> OllamaClient {
        OllamaClient::new(&server.base_url(), model, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn completion_is_trimmed() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/chat")
                    .body_includes(r#""model":"gemma2:2b""#)
                    .body_includes(r#""stream":false"#);
                then.status(200).json_body(json!({
                    "model": "gemma2:2b",
                    "message": {"role": "assistant", "content": "  Rust and Go.\n"},
                    "done": true
                }));
            })
            .await;

        let client = client_for(&server, "gemma2:2b");
        let text = client.complete("system", "What languages?").await.unwrap();

        assert_eq!(text, "Rust and Go.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(500).body("model crashed");
            })
            .await;

        let err = client_for(&server, "gemma2:2b")
            .complete("system", "hi")
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(200).body("not json");
            })
            .await;

        let err = client_for(&server, "gemma2:2b")
            .complete("system", "hi")
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn healthy_only_when_model_listed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/tags");
                then.status(200).json_body(json!({
                    "models": [{"name": "gemma2:2b"}, {"name": "llama3:latest"}]
                }));
            })
            .await;

        assert_eq!(client_for(&server, "gemma2:2b").health().await, LlmHealth::Healthy);
        assert_eq!(client_for(&server, "llama3").health().await, LlmHealth::Healthy);
        assert_eq!(client_for(&server, "mistral:7b").health().await, LlmHealth::ModelMissing);
    }

    #[tokio::test]
    async fn unreachable_server_is_reported_not_raised() {
        // nothing listens on the discard port
        let client = OllamaClient::new("http://127.0.0.1:9", "gemma2:2b", Duration::from_secs(1)).unwrap();
        assert_eq!(client.health().await, LlmHealth::Unreachable);
    }
}
