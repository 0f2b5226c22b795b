use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use validator::Validate;

use crate::{
    constants::{CHAT_SOURCE_LABEL, LLM_PROVIDER},
    entities::chat::{ChatHealthResponse, ChatRequest, ChatResponse},
    errors::AppError,
    llm::{LlmClient, LlmHealth},
    security::sanitize::sanitize_text,
    use_cases::context::ContextBuilder,
};

const SYSTEM_PROMPT: &str = "You are the assistant on a software developer's portfolio website. \
Answer visitor questions about the developer using only the portfolio information provided. \
If the answer is not in that information, say you don't know. \
Skip greetings and pleasantries and answer in at most two sentences.";

/// Used when the portfolio data cannot be loaded; the model still answers
const FALLBACK_CONTEXT: &str = "Portfolio details are temporarily unavailable. \
Let the visitor know and suggest trying again later or using the contact page.";

pub struct ChatHandler {
    llm: Arc<dyn LlmClient>,
    context_builder: ContextBuilder,
}

impl ChatHandler {
    pub fn new(llm: Arc<dyn LlmClient>, context_builder: ContextBuilder) -> Self {
        ChatHandler { llm, context_builder }
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Answers a visitor question with portfolio context from the database
    pub async fn process_chat(&self, request: ChatRequest) -> Result<ChatResponse, AppError> {
        request.validate()?;

        let message = sanitize_text(&request.message);
        if message.is_empty() {
            return Err(AppError::InvalidInput("Message cannot be empty".into()));
        }
        let history = request
            .context
            .as_deref()
            .map(sanitize_text)
            .filter(|c| !c.is_empty());

        let portfolio = match self.context_builder.build(&message).await {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!(error = %e, "chat context unavailable, answering without portfolio data");
                FALLBACK_CONTEXT.to_string()
            }
        };

        let prompt = build_prompt(&portfolio, history.as_deref(), &message);
        let answer = self.llm.complete(SYSTEM_PROMPT, &prompt).await?;

        Ok(ChatResponse {
            response: answer,
            sources: vec![CHAT_SOURCE_LABEL.to_string()],
            model: self.llm.model().to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        })
    }

    pub async fn health(&self) -> (LlmHealth, ChatHealthResponse) {
        let health = self.llm.health().await;
        let body = ChatHealthResponse {
            status: health.as_status().to_string(),
            provider: LLM_PROVIDER.to_string(),
            model: self.llm.model().to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        };
        (health, body)
    }
}

fn build_prompt(portfolio: &str, history: Option<&str>, question: &str) -> String {
    let mut prompt = format!("Portfolio information:\n{}\n\n", portfolio);
    if let Some(history) = history {
        prompt.push_str(&format!("Conversation so far:\n{}\n\n", history));
    }
    prompt.push_str(&format!("Visitor question: {}", question));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::LlmError,
        repositories::{
            content::MockContentRepository, experience::MockExperienceRepository,
            project::MockProjectRepository, skill::MockSkillRepository,
        },
    };
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct RecordingLlm {
        answer: Result<String, ()>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmClient for RecordingLlm {
        async fn complete(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().push(prompt.to_string());
            self.answer
                .clone()
                .map_err(|_| LlmError::Request("connection refused".into()))
        }

        async fn health(&self) -> LlmHealth {
            LlmHealth::Healthy
        }

        fn model(&self) -> &str {
            "gemma2:2b"
        }
    }

    fn context_builder(fail: bool) -> ContextBuilder {
        let mut skills = MockSkillRepository::new();
        if fail {
            skills
                .expect_list()
                .returning(|| Err(AppError::InternalError("db down".into())));
        } else {
            skills.expect_list().returning(|| Ok(vec![]));
        }
        let mut experiences = MockExperienceRepository::new();
        experiences.expect_list_active().returning(|| Ok(vec![]));
        let mut projects = MockProjectRepository::new();
        projects.expect_list_active().returning(|| Ok(vec![]));
        let mut contents = MockContentRepository::new();
        contents.expect_find_by_key().returning(|_| Ok(None));

        ContextBuilder::new(Arc::new(skills), Arc::new(experiences), Arc::new(projects), Arc::new(contents))
    }

    fn request(message: &str, context: Option<&str>) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            context: context.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn answers_with_fixed_source_and_model() {
        let llm = Arc::new(RecordingLlm { answer: Ok("I write Rust.".into()), prompts: Mutex::new(vec![]) });
        let handler = ChatHandler::new(llm.clone(), context_builder(false));

        let response = handler
            .process_chat(request("What do you write?", Some("earlier: hello")))
            .await
            .unwrap();

        assert_eq!(response.response, "I write Rust.");
        assert_eq!(response.sources, vec!["PostgreSQL Database"]);
        assert_eq!(response.model, "gemma2:2b");
        assert!(chrono::DateTime::parse_from_rfc3339(&response.timestamp).is_ok());

        let prompts = llm.prompts.lock();
        assert!(prompts[0].contains("Conversation so far:\nearlier: hello"));
        assert!(prompts[0].ends_with("Visitor question: What do you write?"));
    }

    #[tokio::test]
    async fn context_failure_degrades_to_fallback() {
        let llm = Arc::new(RecordingLlm { answer: Ok("Try later.".into()), prompts: Mutex::new(vec![]) });
        let handler = ChatHandler::new(llm.clone(), context_builder(true));

        let response = handler.process_chat(request("Hi", None)).await.unwrap();

        assert_eq!(response.response, "Try later.");
        assert!(llm.prompts.lock()[0].contains(FALLBACK_CONTEXT));
    }

    #[tokio::test]
    async fn llm_failure_is_upstream_error() {
        let llm = Arc::new(RecordingLlm { answer: Err(()), prompts: Mutex::new(vec![]) });
        let handler = ChatHandler::new(llm, context_builder(false));

        let err = handler.process_chat(request("Hi", None)).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn empty_model_answer_is_passed_through() {
        let llm = Arc::new(RecordingLlm { answer: Ok(String::new()), prompts: Mutex::new(vec![]) });
        let handler = ChatHandler::new(llm, context_builder(false));

        let response = handler.process_chat(request("Hi", None)).await.unwrap();
        assert_eq!(response.response, "");
        assert_eq!(response.sources, vec!["PostgreSQL Database"]);
    }

    #[tokio::test]
    async fn markup_only_message_is_rejected() {
        let llm = Arc::new(RecordingLlm { answer: Ok("x".into()), prompts: Mutex::new(vec![]) });
        let handler = ChatHandler::new(llm, context_builder(false));

        let err = handler
            .process_chat(request("<script>alert(1)</script>", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
