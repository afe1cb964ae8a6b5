//! Heavyrag Core Library
//!
//! This crate provides the foundational utilities for the heavy machinery
//! assistant:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management
//! - Retrieved context chunk types shared by the prompt and knowledge crates

pub mod chunk;
pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use chunk::{ChunkContent, ContextChunk};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
