//! Citation extraction for generated answers.
//!
//! Source file names come from each chunk's source location. Chunks without
//! a usable location are skipped; citation problems never hide the answer.

use crate::rag::types::RagResponse;
use heavyrag_core::ContextChunk;
use std::collections::HashSet;

/// Distinct source file names of the chunks, in first-seen order.
pub fn extract_source_files(chunks: &[ContextChunk]) -> Vec<String> {
    let mut seen = HashSet::new();

    chunks
        .iter()
        .filter_map(|chunk| {
            let name = chunk.source_file_name();
            if name.is_none() {
                tracing::debug!("Skipping chunk without a usable source location");
            }
            name
        })
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Attach the citation list derived from `chunks` to a generated answer.
pub fn compose_response(answer: impl Into<String>, chunks: &[ContextChunk]) -> RagResponse {
    RagResponse::new(answer.into(), extract_source_files(chunks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duplicates_collapse() {
        let chunks = vec![
            ContextChunk::new("a").with_s3_uri("s3://b/doc1.pdf"),
            ContextChunk::new("b").with_s3_uri("s3://b/doc1.pdf"),
            ContextChunk::new("c").with_s3_uri("s3://b/doc2.pdf"),
        ];

        assert_eq!(extract_source_files(&chunks), vec!["doc1.pdf", "doc2.pdf"]);

        let text = compose_response("Answer.", &chunks).render();
        assert!(text.contains("[1] doc1.pdf\n"));
        assert!(text.contains("[2] doc2.pdf\n"));
        assert!(!text.contains("[3]"));
    }

    #[test]
    fn test_first_seen_order() {
        let chunks = vec![
            ContextChunk::new("a").with_s3_uri("s3://kb/zeta.pdf"),
            ContextChunk::new("b").with_s3_uri("s3://kb/alpha.pdf"),
            ContextChunk::new("c").with_s3_uri("s3://other-bucket/zeta.pdf"),
        ];

        assert_eq!(extract_source_files(&chunks), vec!["zeta.pdf", "alpha.pdf"]);
    }

    #[test]
    fn test_chunk_without_location_is_skipped() {
        let chunks = vec![
            ContextChunk::new("no location"),
            ContextChunk::new("cited").with_s3_uri("s3://kb/loader.pdf"),
        ];

        let text = compose_response("Check the bucket teeth.", &chunks).render();
        assert!(text.starts_with("Check the bucket teeth.\n\n"));
        assert!(text.ends_with("📚 Reference Documents:\n[1] loader.pdf\n"));
    }

    #[test]
    fn test_all_malformed_keeps_header() {
        let chunks = vec![
            ContextChunk::new("a"),
            ContextChunk::new("b").with_location(json!({ "s3Location": "s3://kb/x.pdf" })),
            ContextChunk::new("c").with_location(json!([1, 2, 3])),
            ContextChunk::new("d").with_location(json!({ "s3Location": { "uri": null } })),
        ];

        let response = compose_response("Answer.", &chunks);
        assert!(response.sources.is_empty());
        assert_eq!(response.render(), "Answer.\n\n📚 Reference Documents:\n");
    }

    #[test]
    fn test_no_chunks() {
        assert!(extract_source_files(&[]).is_empty());
    }
}
