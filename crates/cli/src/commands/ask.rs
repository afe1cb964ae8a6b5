//! Ask command handler.
//!
//! Answers a single question and exits.

use clap::Args;
use heavyrag_core::{config::AppConfig, AppError, AppResult};
use heavyrag_knowledge::{RagOutcome, RagPipeline};
use std::path::PathBuf;

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "question")]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.get_question()?;
        let pipeline = RagPipeline::from_config(config)?;
        let outcome = pipeline.get_rag_response(&question).await?;

        if self.json {
            println!("{}", render_json(&question, &outcome)?);
        } else {
            println!("{}", outcome);
        }

        Ok(())
    }

    fn get_question(&self) -> AppResult<String> {
        let question = match (&self.question, &self.file) {
            (Some(question), _) => question.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => return Err(AppError::Config("No question provided".to_string())),
        };

        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Config("Question is empty".to_string()));
        }

        Ok(question.to_string())
    }
}

/// JSON document for `--json`: the question plus the tagged outcome fields.
fn render_json(question: &str, outcome: &RagOutcome) -> AppResult<String> {
    let mut value = serde_json::to_value(outcome)?;
    if let Some(object) = value.as_object_mut() {
        object.insert("question".to_string(), question.into());
        object.insert("text".to_string(), outcome.to_string().into());
    }
    Ok(serde_json::to_string_pretty(&value)?)
}
