//! Prompt types for the heavy machinery assistant.

use serde::{Deserialize, Serialize};

/// Identifier of the built-in prompt.
pub const DEFAULT_PROMPT_ID: &str = "machinery.rag.default";

/// Built-in instruction template.
///
/// `{{context}}` receives the numbered document sections and `{{question}}`
/// the raw user question.
const DEFAULT_TEMPLATE: &str = "Human: You are a specialized assistant for heavy machinery and industrial equipment.

Please use the provided technical documentation to answer the question accurately.
If the context doesn't contain relevant information, clearly state that you cannot answer based on the available documents.

<technical_documents>
{{context}}
</technical_documents>

<user_question>
{{question}}
</user_question>

Provide a detailed, technical response based solely on the documents above.

Assistant:
";

/// A prompt definition, either built in or loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Template string with Handlebars syntax
    pub template: String,
}

impl PromptDefinition {
    /// The built-in heavy machinery RAG prompt.
    pub fn machinery_default() -> Self {
        Self {
            id: DEFAULT_PROMPT_ID.to_string(),
            title: "Heavy machinery technical assistant".to_string(),
            api_version: "1.0".to_string(),
            created_by: "heavyrag".to_string(),
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl Default for PromptDefinition {
    fn default() -> Self {
        Self::machinery_default()
    }
}

/// A fully built prompt ready for generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// Rendered prompt text
    pub text: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Number of document sections in the context block
    #[serde(rename = "documentCount")]
    pub document_count: usize,
}

impl BuiltPrompt {
    /// Create a new built prompt.
    pub fn new(text: String, source_prompt_id: String, document_count: usize) -> Self {
        Self {
            text,
            metadata: BuiltPromptMetadata {
                source_prompt_id,
                document_count,
            },
        }
    }
}
