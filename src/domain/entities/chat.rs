use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 2000, message = "Message must be between 1 and 2000 characters"))]
    pub message: String,

    /// Earlier turns of the conversation, kept by the browser
    #[validate(length(max = 8000, message = "Context must be at most 8000 characters"))]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub sources: Vec<String>,
    pub model: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHealthResponse {
    pub status: String,
    pub provider: String,
    pub model: String,
    pub timestamp: String,
}
