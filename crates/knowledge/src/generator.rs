//! Answer generation from a built prompt.

use heavyrag_core::config::GenerationSettings;
use heavyrag_core::AppResult;
use heavyrag_llm::{LlmClient, LlmRequest};
use std::sync::Arc;

/// Trait for text-generation backends.
#[async_trait::async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Generate an answer for a fully built prompt.
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}

/// Generator that sends the prompt to an LLM client with fixed sampling settings.
pub struct LlmGenerator {
    client: Arc<dyn LlmClient>,
    model: String,
    settings: GenerationSettings,
}

impl LlmGenerator {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, settings: GenerationSettings) -> Self {
        Self {
            client,
            model: model.into(),
            settings,
        }
    }

    fn to_request(&self, prompt: &str) -> LlmRequest {
        LlmRequest::new(prompt, &self.model)
            .with_temperature(self.settings.temperature)
            .with_top_p(self.settings.top_p)
            .with_max_tokens(self.settings.max_tokens)
    }
}

#[async_trait::async_trait]
impl ResponseGenerator for LlmGenerator {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        tracing::debug!(
            "Generating answer with {} (prompt: {} bytes)",
            self.client.provider_name(),
            prompt.len()
        );

        let response = self.client.complete(&self.to_request(prompt)).await?;

        tracing::debug!(
            "Token usage - Prompt: {}, Completion: {}, Total: {}",
            response.usage.prompt_tokens,
            response.usage.completion_tokens,
            response.usage.total_tokens
        );

        Ok(response.content)
    }
}
