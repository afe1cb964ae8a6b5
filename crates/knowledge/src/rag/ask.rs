//! RAG answering orchestration.
//!
//! Validates the question, retrieves context, builds the prompt, generates
//! an answer and attaches citations, in that order. Each step runs only if
//! the previous one succeeded; nothing is retried.

use crate::generator::{LlmGenerator, ResponseGenerator};
use crate::rag::citations::compose_response;
use crate::rag::types::{RagOutcome, RagStage};
use crate::retriever::{HttpKnowledgeBase, KnowledgeBase};
use crate::validator::{DomainValidator, LlmDomainValidator};
use heavyrag_core::{AppConfig, AppResult};
use heavyrag_prompt::{build_rag_prompt, resolve_prompt, PromptDefinition};
use std::sync::Arc;
use tracing::Instrument;

/// Question-answering pipeline over injected collaborators.
pub struct RagPipeline {
    validator: Arc<dyn DomainValidator>,
    knowledge_base: Arc<dyn KnowledgeBase>,
    generator: Arc<dyn ResponseGenerator>,
    prompt: PromptDefinition,
}

impl RagPipeline {
    /// Create a pipeline using the built-in prompt.
    pub fn new(
        validator: Arc<dyn DomainValidator>,
        knowledge_base: Arc<dyn KnowledgeBase>,
        generator: Arc<dyn ResponseGenerator>,
    ) -> Self {
        Self {
            validator,
            knowledge_base,
            generator,
            prompt: PromptDefinition::machinery_default(),
        }
    }

    /// Replace the prompt definition.
    pub fn with_prompt(mut self, prompt: PromptDefinition) -> Self {
        self.prompt = prompt;
        self
    }

    /// Wire the pipeline to the configured LLM and retrieval backends.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let client = heavyrag_llm::create_client(&config.llm)?;

        let validator = LlmDomainValidator::new(client.clone(), config.llm.classifier_model());
        let generator = LlmGenerator::new(client, &config.llm.model, config.generation.clone());
        let knowledge_base =
            HttpKnowledgeBase::from_settings(&config.knowledge, config.resolve_kb_api_key())?;
        let prompt = resolve_prompt(&config.workspace, config.prompt_id.as_deref())?;

        tracing::debug!(
            "RAG pipeline ready (model: {}, knowledge base: {:?}, prompt: {})",
            config.llm.model,
            config.knowledge.knowledge_base_id,
            prompt.id
        );

        Ok(Self::new(Arc::new(validator), Arc::new(knowledge_base), Arc::new(generator))
            .with_prompt(prompt))
    }

    /// Answer a question.
    pub async fn get_rag_response(&self, question: &str) -> AppResult<RagOutcome> {
        self.get_rag_response_with_progress(question, |_| {}).await
    }

    /// Answer a question, reporting each stage to `on_stage` before it runs.
    ///
    /// Out-of-domain questions and empty retrievals end the run with the
    /// matching outcome. Retrieval and generation errors are returned as is.
    pub async fn get_rag_response_with_progress<F>(
        &self,
        question: &str,
        on_stage: F,
    ) -> AppResult<RagOutcome>
    where
        F: FnMut(RagStage) + Send,
    {
        let span = tracing::info_span!("rag", question_len = question.len());
        self.run(question, on_stage).instrument(span).await
    }

    async fn run<F>(&self, question: &str, mut on_stage: F) -> AppResult<RagOutcome>
    where
        F: FnMut(RagStage) + Send,
    {
        on_stage(RagStage::Validating);
        if !self.validator.is_valid(question).await? {
            tracing::info!("Question rejected as out of domain");
            return Ok(RagOutcome::OutOfDomain);
        }

        on_stage(RagStage::Retrieving);
        let chunks = self.knowledge_base.retrieve(question).await?;
        if chunks.is_empty() {
            tracing::info!("No documentation retrieved for question");
            return Ok(RagOutcome::NoResults);
        }

        let (prompt, sources) = build_rag_prompt(&self.prompt, question, chunks)?;

        on_stage(RagStage::Generating);
        let answer = self.generator.generate(&prompt.text).await?;

        let response = compose_response(answer, &sources);
        tracing::info!(
            "Answered from {} sections citing {} documents",
            prompt.metadata.document_count,
            response.sources.len()
        );

        Ok(RagOutcome::Answered(response))
    }
}
