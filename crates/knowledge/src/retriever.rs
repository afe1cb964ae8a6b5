//! Knowledge base retrieval.
//!
//! Defines the retrieval seam used by the RAG pipeline and an HTTP client
//! for services exposing the knowledge base *Retrieve* contract:
//!
//! ```text
//! POST {endpoint}/knowledgebases/{id}/retrieve
//! {"retrievalQuery": {"text": "..."},
//!  "retrievalConfiguration": {"vectorSearchConfiguration": {"numberOfResults": 3}}}
//!
//! 200 {"retrievalResults": [{"content": {"text": "..."},
//!                            "location": {"type": "S3", "s3Location": {"uri": "s3://..."}},
//!                            "score": 0.62}]}
//! ```

use heavyrag_core::config::KnowledgeSettings;
use heavyrag_core::{AppError, AppResult, ContextChunk};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Trait for knowledge base backends.
///
/// Returns chunks in the backend's relevance order, possibly empty.
/// Backend failures are returned as errors and never mapped to an empty
/// result.
#[async_trait::async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Retrieve context chunks relevant to the question.
    async fn retrieve(&self, question: &str) -> AppResult<Vec<ContextChunk>>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveRequest<'a> {
    retrieval_query: RetrievalQuery<'a>,
    retrieval_configuration: RetrievalConfiguration,
}

#[derive(Debug, Serialize)]
struct RetrievalQuery<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalConfiguration {
    vector_search_configuration: VectorSearchConfiguration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VectorSearchConfiguration {
    number_of_results: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveResponse {
    #[serde(default)]
    retrieval_results: Vec<ContextChunk>,
}

/// HTTP client for a knowledge base retrieval service.
pub struct HttpKnowledgeBase {
    endpoint: String,
    knowledge_base_id: String,
    number_of_results: u32,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpKnowledgeBase {
    /// Create a client for `knowledge_base_id` served at `endpoint`.
    pub fn new(endpoint: impl Into<String>, knowledge_base_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            knowledge_base_id: knowledge_base_id.into(),
            number_of_results: 3,
            api_key: None,
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from configuration.
    ///
    /// # Errors
    /// Returns `AppError::Config` when no knowledge base id is configured.
    pub fn from_settings(settings: &KnowledgeSettings, api_key: Option<String>) -> AppResult<Self> {
        let knowledge_base_id = settings
            .knowledge_base_id
            .clone()
            .ok_or_else(|| AppError::Config("No knowledge base id configured".to_string()))?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = settings.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Knowledge(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: settings.endpoint.clone(),
            knowledge_base_id,
            number_of_results: settings.number_of_results,
            api_key,
            client,
        })
    }

    /// Set how many chunks are requested per query.
    pub fn with_number_of_results(mut self, number_of_results: u32) -> Self {
        self.number_of_results = number_of_results;
        self
    }

    fn retrieve_url(&self) -> String {
        format!(
            "{}/knowledgebases/{}/retrieve",
            self.endpoint.trim_end_matches('/'),
            self.knowledge_base_id
        )
    }

    fn to_request<'a>(&self, question: &'a str) -> RetrieveRequest<'a> {
        RetrieveRequest {
            retrieval_query: RetrievalQuery { text: question },
            retrieval_configuration: RetrievalConfiguration {
                vector_search_configuration: VectorSearchConfiguration {
                    number_of_results: self.number_of_results,
                },
            },
        }
    }
}

/// Parse a Retrieve response body into chunks, keeping backend order.
fn parse_retrieve_response(body: &str) -> AppResult<Vec<ContextChunk>> {
    let response: RetrieveResponse = serde_json::from_str(body)
        .map_err(|e| AppError::Knowledge(format!("Failed to parse retrieval response: {}", e)))?;
    Ok(response.retrieval_results)
}

#[async_trait::async_trait]
impl KnowledgeBase for HttpKnowledgeBase {
    async fn retrieve(&self, question: &str) -> AppResult<Vec<ContextChunk>> {
        let url = self.retrieve_url();
        tracing::debug!(
            "Querying knowledge base '{}' for {} results",
            self.knowledge_base_id,
            self.number_of_results
        );

        let mut request = self.client.post(&url).json(&self.to_request(question));
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            AppError::Knowledge(format!("Failed to reach knowledge base at {}: {}", url, e))
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to read retrieval response: {}", e)))?;

        if !status.is_success() {
            return Err(AppError::Knowledge(format!(
                "Knowledge base API error ({}): {}",
                status, body
            )));
        }

        let chunks = parse_retrieve_response(&body)?;
        tracing::info!(
            "Retrieved {} chunks from knowledge base '{}'",
            chunks.len(),
            self.knowledge_base_id
        );

        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieve_url() {
        let kb = HttpKnowledgeBase::new("http://kb.local:8080/", "MACHINERY");
        assert_eq!(
            kb.retrieve_url(),
            "http://kb.local:8080/knowledgebases/MACHINERY/retrieve"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let kb = HttpKnowledgeBase::new("http://kb", "KB1").with_number_of_results(5);
        let body = serde_json::to_value(kb.to_request("Bulldozer blade wear?")).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "retrievalQuery": { "text": "Bulldozer blade wear?" },
                "retrievalConfiguration": {
                    "vectorSearchConfiguration": { "numberOfResults": 5 }
                }
            })
        );
    }

    #[test]
    fn test_parse_response_preserves_order() {
        let body = r#"{
            "retrievalResults": [
                {"content": {"text": "first"}, "location": {"type": "S3", "s3Location": {"uri": "s3://kb/a.pdf"}}, "score": 0.9},
                {"content": {"text": "second"}},
                {"content": {"text": "third"}, "location": {"type": "WEB", "webLocation": {"url": "https://x"}}}
            ]
        }"#;

        let chunks = parse_retrieve_response(body).unwrap();
        let texts: Vec<&str> = chunks.iter().map(|c| c.text()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(chunks[0].source_file_name(), Some("a.pdf"));
        assert_eq!(chunks[1].source_file_name(), None);
        assert_eq!(chunks[2].source_file_name(), None);
    }

    #[test]
    fn test_parse_empty_response() {
        assert!(parse_retrieve_response("{}").unwrap().is_empty());
        assert!(parse_retrieve_response(r#"{"retrievalResults": []}"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_parse_result_without_text_is_error() {
        let body = r#"{"retrievalResults": [{"location": {}}]}"#;
        assert!(matches!(
            parse_retrieve_response(body),
            Err(AppError::Knowledge(_))
        ));
    }

    #[test]
    fn test_from_settings_requires_id() {
        let settings = KnowledgeSettings::default();
        assert!(HttpKnowledgeBase::from_settings(&settings, None).is_err());

        let settings = KnowledgeSettings {
            knowledge_base_id: Some("KB9".to_string()),
            number_of_results: 4,
            ..KnowledgeSettings::default()
        };
        let kb = HttpKnowledgeBase::from_settings(&settings, Some("token".to_string())).unwrap();
        assert_eq!(kb.number_of_results, 4);
        assert_eq!(kb.api_key.as_deref(), Some("token"));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_knowledge_error() {
        let settings = KnowledgeSettings {
            endpoint: "http://127.0.0.1:9".to_string(),
            knowledge_base_id: Some("KB".to_string()),
            timeout: Some(1),
            ..KnowledgeSettings::default()
        };
        let kb = HttpKnowledgeBase::from_settings(&settings, None).unwrap();
        let result = kb.retrieve("question").await;
        assert!(matches!(result, Err(AppError::Knowledge(_))));
    }
}
