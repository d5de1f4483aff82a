use crate::config::LLMConfig;
use crate::types::{AppResult, LLMRequest, LLMResponse};
use async_trait::async_trait;

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// Facade over the configured chat-completion backend.
pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
    default_model: String,
}

impl LLM {
    /// Build the adapter from configuration. Any OpenAI-compatible endpoint
    /// works via `base_url`.
    pub fn from_config(config: &LLMConfig) -> Self {
        let adapter = Box::new(crate::llm::openai::OpenAIAdapter::with_base_url(
            &config.api_key,
            &config.base_url,
        ));
        Self {
            adapter,
            default_model: config.model.clone(),
        }
    }

    /// Wrap an arbitrary adapter (used by tests to substitute a scripted one)
    pub fn from_adapter(adapter: Box<dyn LLMAdapter>, default_model: impl Into<String>) -> Self {
        Self {
            adapter,
            default_model: default_model.into(),
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }
}
