//! Prompt builder for rendering retrieved context into a template.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use heavyrag_core::{AppError, AppResult, ContextChunk};

/// Build the retrieval-augmented prompt for a question.
///
/// Chunks are numbered in retrieval order as "Document Section N" and
/// rendered together with the raw question into the definition's template.
/// The chunk sequence is handed back unchanged so the caller can build
/// citations without a second retrieval.
///
/// # Errors
/// Returns `AppError::Prompt` if `chunks` is empty or the template fails
/// to render.
///
/// # Example
/// ```
/// use heavyrag_core::ContextChunk;
/// use heavyrag_prompt::{build_rag_prompt, PromptDefinition};
///
/// let chunks = vec![ContextChunk::new("Change hydraulic fluid every 500 hours.")];
/// let (prompt, chunks) = build_rag_prompt(
///     &PromptDefinition::machinery_default(),
///     "How often is the hydraulic fluid changed?",
///     chunks,
/// )
/// .unwrap();
///
/// assert!(prompt.text.contains("Document Section 1:\nChange hydraulic fluid"));
/// assert_eq!(chunks.len(), 1);
/// ```
pub fn build_rag_prompt(
    definition: &PromptDefinition,
    question: &str,
    chunks: Vec<ContextChunk>,
) -> AppResult<(BuiltPrompt, Vec<ContextChunk>)> {
    if chunks.is_empty() {
        return Err(AppError::Prompt(
            "Cannot build a prompt without retrieved context".to_string(),
        ));
    }

    tracing::debug!(
        "Building prompt '{}' with {} document sections",
        definition.id,
        chunks.len()
    );

    let context = build_context_block(&chunks);
    let text = render_template(&definition.template, &context, question)?;

    let prompt = BuiltPrompt::new(text, definition.id.clone(), chunks.len());
    Ok((prompt, chunks))
}

/// Concatenate chunk texts into the numbered context block.
///
/// Each chunk contributes `"Document Section {n}:\n{text}\n\n"`; the joined
/// block is trimmed of surrounding whitespace.
pub fn build_context_block(chunks: &[ContextChunk]) -> String {
    let mut context = String::new();

    for (i, chunk) in chunks.iter().enumerate() {
        context.push_str(&format!("Document Section {}:\n{}\n\n", i + 1, chunk.text()));
    }

    context.trim().to_string()
}

/// Render a Handlebars template with the context block and question.
fn render_template(template: &str, context: &str, question: &str) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let data = serde_json::json!({
        "context": context,
        "question": question,
    });

    handlebars
        .render("prompt", &data)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
