//! Chat command handler.
//!
//! Runs the interactive question/answer session.

use clap::Args;
use heavyrag_core::{config::AppConfig, AppResult};
use heavyrag_knowledge::RagPipeline;
use std::future::Future;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Words that end the session, compared case-insensitively.
const EXIT_COMMANDS: [&str; 3] = ["quit", "exit", "bye"];

const SEPARATOR_WIDTH: usize = 55;

/// Start an interactive session
#[derive(Args, Debug, Default)]
pub struct ChatCommand {
    /// Hide the progress lines printed while a question is processed
    #[arg(long)]
    pub quiet: bool,
}

/// How an interactive session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user typed an exit command
    Exit,
    /// Standard input was closed
    EndOfInput,
    /// Ctrl-C was pressed
    Interrupted,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let pipeline = RagPipeline::from_config(config)?;
        let input = tokio::io::BufReader::new(tokio::io::stdin());
        let mut output = std::io::stdout();
        let interrupt = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        let end = run_chat(&pipeline, input, &mut output, interrupt, !self.quiet).await?;
        tracing::debug!("Session ended: {:?}", end);

        Ok(())
    }
}

/// Drive a session: read questions from `input`, write replies to `output`.
///
/// Each question is answered completely before the next line is read.
/// A failed question is reported and the session continues.
pub async fn run_chat<R, W, I>(
    pipeline: &RagPipeline,
    input: R,
    output: &mut W,
    interrupt: I,
    show_progress: bool,
) -> AppResult<SessionEnd>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send,
    I: Future<Output = ()>,
{
    print_banner(output)?;

    let mut lines = input.lines();
    tokio::pin!(interrupt);

    loop {
        write!(output, "\nYou: ")?;
        output.flush()?;

        let line = tokio::select! {
            biased;
            _ = &mut interrupt => None,
            line = lines.next_line() => Some(line?),
        };

        let Some(line) = line else {
            writeln!(output, "\n\nSession interrupted. Thank you for your time!")?;
            return Ok(SessionEnd::Interrupted);
        };

        let Some(line) = line else {
            writeln!(output, "\n\nSession ended. Thank you for using our service!")?;
            return Ok(SessionEnd::EndOfInput);
        };

        let question = line.trim();

        if is_exit_command(question) {
            writeln!(
                output,
                "\nThank you for using the Heavy Machinery Assistant. Goodbye!"
            )?;
            return Ok(SessionEnd::Exit);
        }

        if question.is_empty() {
            writeln!(output, "Bot: Please enter a question about heavy machinery.")?;
            continue;
        }

        let mut progress_error = None;
        let result = {
            let answer = pipeline.get_rag_response_with_progress(question, |stage| {
                if show_progress && progress_error.is_none() {
                    if let Err(e) = writeln!(output, "Bot: {}", stage.status_message()) {
                        progress_error = Some(e);
                    }
                }
            });

            tokio::select! {
                biased;
                _ = &mut interrupt => None,
                result = answer => Some(result),
            }
        };

        if let Some(e) = progress_error {
            return Err(e.into());
        }

        match result {
            None => {
                writeln!(output, "\n\nSession interrupted. Thank you for your time!")?;
                return Ok(SessionEnd::Interrupted);
            }
            Some(Ok(outcome)) => {
                writeln!(output, "\n🤖 Assistant: {}", outcome)?;
            }
            Some(Err(e)) => {
                tracing::error!("Question failed: {}", e);
                writeln!(output, "\nBot: Sorry, I could not answer that: {}", e)?;
            }
        }
        writeln!(output, "{}", "─".repeat(SEPARATOR_WIDTH))?;
    }
}

fn is_exit_command(input: &str) -> bool {
    EXIT_COMMANDS
        .iter()
        .any(|cmd| input.eq_ignore_ascii_case(cmd))
}

fn print_banner<W: Write>(output: &mut W) -> AppResult<()> {
    writeln!(output, "╔══════════════════════════════════════════════════╗")?;
    writeln!(output, "║    Heavy Machinery Technical Assistant           ║")?;
    writeln!(output, "║                                                  ║")?;
    writeln!(output, "╚══════════════════════════════════════════════════╝")?;
    writeln!(output, "\n🔧 Specialized in: Construction equipment, industrial machinery,")?;
    writeln!(output, "   maintenance procedures, and technical specifications")?;
    writeln!(output, "\n💡 Available commands:")?;
    writeln!(output, "   • Type your question about heavy machinery")?;
    writeln!(output, "   • Type 'quit' or 'exit' to end session")?;
    writeln!(output, "\n{}", "─".repeat(SEPARATOR_WIDTH))?;
    Ok(())
}
