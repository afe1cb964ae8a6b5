//! LLM provider factory.
//!
//! Creates LLM clients from the configured provider name.

use crate::client::LlmClient;
use crate::providers::OllamaClient;
use heavyrag_core::config::LlmSettings;
use heavyrag_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client for the configured provider.
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown and
/// `AppError::Llm` if the HTTP client cannot be built.
pub fn create_client(settings: &LlmSettings) -> AppResult<Arc<dyn LlmClient>> {
    match settings.provider.to_lowercase().as_str() {
        "ollama" => {
            let client = match settings.timeout {
                Some(secs) => OllamaClient::with_timeout(
                    settings.endpoint.as_str(),
                    Duration::from_secs(secs),
                )?,
                None => OllamaClient::with_base_url(settings.endpoint.as_str()),
            };
            tracing::debug!("Created Ollama client for {}", settings.endpoint);
            Ok(Arc::new(client))
        }
        other => Err(AppError::Config(format!("Unknown provider: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client(&LlmSettings::default()).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_without_timeout() {
        let settings = LlmSettings {
            endpoint: "http://localhost:8080".to_string(),
            timeout: None,
            ..LlmSettings::default()
        };
        assert!(create_client(&settings).is_ok());
    }

    #[test]
    fn test_unknown_provider() {
        let settings = LlmSettings {
            provider: "unknown".to_string(),
            ..LlmSettings::default()
        };
        match create_client(&settings) {
            Err(AppError::Config(msg)) => assert!(msg.contains("Unknown provider")),
            Err(other) => panic!("Unexpected error: {}", other),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
