use async_trait::async_trait;

use crate::errors::LlmError;

pub mod ollama;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmHealth {
    Healthy,
    /// The server answered but does not have the configured model
    ModelMissing,
    Unreachable,
}

impl LlmHealth {
    pub fn as_status(&self) -> &'static str {
        match self {
            LlmHealth::Healthy => "healthy",
            LlmHealth::ModelMissing | LlmHealth::Unreachable => "degraded",
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, LlmHealth::Healthy)
    }
}

/// Text-completion backend used by the chat endpoint
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends one system + user exchange and returns the trimmed answer
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    async fn health(&self) -> LlmHealth;

    fn model(&self) -> &str;
}
