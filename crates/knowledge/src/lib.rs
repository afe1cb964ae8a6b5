//! Retrieval-augmented answering for heavy machinery questions.
//!
//! The pipeline consumes three collaborators through traits so each can be
//! swapped for another backend or a test double:
//! - [`DomainValidator`] decides whether a question is in scope
//! - [`KnowledgeBase`] retrieves supporting document chunks
//! - [`ResponseGenerator`] produces the answer from the built prompt

pub mod generator;
pub mod rag;
pub mod retriever;
pub mod validator;

// Re-export commonly used types
pub use generator::{LlmGenerator, ResponseGenerator};
pub use rag::{RagOutcome, RagPipeline, RagResponse, RagStage};
pub use retriever::{HttpKnowledgeBase, KnowledgeBase};
pub use validator::{DomainValidator, LlmDomainValidator};
