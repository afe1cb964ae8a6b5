//! RAG (Retrieval-Augmented Generation) answering system.
//!
//! Answers heavy machinery questions from retrieved documentation and cites
//! the documents used.

pub mod ask;
pub mod citations;
pub mod types;

pub use ask::RagPipeline;
pub use citations::{compose_response, extract_source_files};
pub use types::{RagOutcome, RagResponse, RagStage};
