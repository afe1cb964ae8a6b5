//! RAG response types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reply when the question is outside the supported domain.
pub const OUT_OF_DOMAIN_MESSAGE: &str = "I specialize in heavy machinery topics only. \
Please ask a question about industrial equipment, machinery maintenance, or related technical subjects.";

/// Reply when retrieval finds nothing for an in-domain question.
pub const NO_RESULTS_MESSAGE: &str = "No relevant technical documentation found for your query. \
Please try rephrasing your question about heavy machinery.";

/// Header placed between the answer and the numbered source list.
pub const CITATION_HEADER: &str = "📚 Reference Documents:";

/// A generated answer with the distinct source documents behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagResponse {
    /// Text produced by the generation backend
    pub answer: String,

    /// Distinct source file names, in first-seen retrieval order
    pub sources: Vec<String>,
}

impl RagResponse {
    pub fn new(answer: String, sources: Vec<String>) -> Self {
        Self { answer, sources }
    }

    /// Render the user-facing text: answer, header, then `[n] file` lines.
    ///
    /// The header is present even when no source could be cited.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RagResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\n{}\n", self.answer, CITATION_HEADER)?;
        for (i, source) in self.sources.iter().enumerate() {
            writeln!(f, "[{}] {}", i + 1, source)?;
        }
        Ok(())
    }
}

/// Terminal state of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RagOutcome {
    /// The validator rejected the question; nothing was retrieved
    OutOfDomain,

    /// Retrieval returned no chunks; nothing was generated
    NoResults,

    /// An answer was generated and cited
    Answered(RagResponse),
}

impl RagOutcome {
    /// Text shown to the user for this outcome.
    pub fn into_text(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RagOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfDomain => f.write_str(OUT_OF_DOMAIN_MESSAGE),
            Self::NoResults => f.write_str(NO_RESULTS_MESSAGE),
            Self::Answered(response) => fmt::Display::fmt(response, f),
        }
    }
}

/// Pipeline stage about to run, reported to progress observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RagStage {
    Validating,
    Retrieving,
    Generating,
}

impl RagStage {
    /// Status line for interactive sessions.
    pub fn status_message(&self) -> &'static str {
        match self {
            Self::Validating => "Analyzing your question...",
            Self::Retrieving => "Searching technical documentation...",
            Self::Generating => "Generating technical response...",
        }
    }
}
