//! Retrieved context chunk types.
//!
//! A chunk is owned by the knowledge base backend and is read-only to the
//! rest of the application. The text payload is required; the source
//! location is kept as raw JSON so a missing or oddly shaped location never
//! prevents the chunk itself from being used.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON pointer to the source URI inside a chunk location.
const S3_URI_POINTER: &str = "/s3Location/uri";

/// Text payload of a retrieved chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkContent {
    /// Retrieved passage text
    pub text: String,
}

/// A unit of retrieved document content paired with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextChunk {
    /// Retrieved passage
    pub content: ChunkContent,

    /// Source location as returned by the backend,
    /// e.g. `{"type": "S3", "s3Location": {"uri": "s3://bucket/manual.pdf"}}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,

    /// Backend relevance score, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Backend-specific metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl ContextChunk {
    /// Create a chunk with text and no source location.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            content: ChunkContent { text: text.into() },
            location: None,
            score: None,
            metadata: None,
        }
    }

    /// Attach an S3-style source location.
    pub fn with_s3_uri(self, uri: impl Into<String>) -> Self {
        let location = serde_json::json!({
            "type": "S3",
            "s3Location": { "uri": uri.into() }
        });
        self.with_location(location)
    }

    /// Attach a raw source location.
    pub fn with_location(mut self, location: Value) -> Self {
        self.location = Some(location);
        self
    }

    /// Passage text.
    pub fn text(&self) -> &str {
        &self.content.text
    }

    /// Source URI, if the location carries a string at `s3Location.uri`.
    pub fn source_uri(&self) -> Option<&str> {
        self.location
            .as_ref()?
            .pointer(S3_URI_POINTER)?
            .as_str()
    }

    /// File name of the source document: the segment after the final `/`.
    ///
    /// Returns `None` when the chunk has no usable source location.
    pub fn source_file_name(&self) -> Option<&str> {
        self.source_uri()?
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
    }
}
