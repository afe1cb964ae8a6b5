//! Prompt system for the heavy machinery assistant.
//!
//! This crate provides structured prompt management with:
//! - A built-in retrieval-augmented prompt for heavy machinery questions
//! - YAML-based prompt definitions that can replace it
//! - Handlebars template rendering of retrieved context and the question

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{build_context_block, build_rag_prompt};
pub use loader::{load_prompt, resolve_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, DEFAULT_PROMPT_ID};
