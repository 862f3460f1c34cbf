//! Interactive question loop.
//!
//! Reads one question per line, runs the pipeline synchronously, and prints
//! progress, the generated SQL and the answer. A failed question prints an
//! error line and the loop carries on.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::{BallerError, Result};
use crate::llm::prompt::format_results;
use crate::pipeline::{Pipeline, PipelineEvent, PipelineObserver, PipelineOutcome};

/// Banner printed when the session starts.
pub const WELCOME: &str = "Welcome to BallerSQL! Your one stop for all basketball team questions.\n\
                           Ask questions about players, teams, coaches, and games!\n\
                           Type 'quit' to exit.\n";

/// Input prompt.
pub const PROMPT: &str = "Your question: ";

/// Words that end the session, compared case-insensitively.
const EXIT_WORDS: [&str; 3] = ["quit", "exit", "q"];

/// What to do with one line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction<'a> {
    /// End the session.
    Exit,
    /// Blank line; prompt again.
    Skip,
    /// Run the pipeline on this (trimmed) question.
    Question(&'a str),
}

/// Classifies a raw input line.
pub fn classify_input(line: &str) -> InputAction<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        InputAction::Skip
    } else if EXIT_WORDS.iter().any(|w| trimmed.eq_ignore_ascii_case(w)) {
        InputAction::Exit
    } else {
        InputAction::Question(trimmed)
    }
}

/// Returns the status line printed for a pipeline event.
pub fn event_line(event: PipelineEvent<'_>) -> String {
    match event {
        PipelineEvent::Generating => "\nGenerating SQL query...".to_string(),
        PipelineEvent::Generated { sql } => format!("Query: {sql}\n"),
        PipelineEvent::Executing => "Executing query...".to_string(),
        PipelineEvent::Executed { row_count } => format!("Found {row_count} result(s)\n"),
        PipelineEvent::Narrating => "Analyzing results...".to_string(),
    }
}

/// Prints pipeline progress to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl PipelineObserver for ConsoleObserver {
    fn on_event(&self, event: PipelineEvent<'_>) {
        println!("{}", event_line(event));
    }
}

/// Renders the final part of a question's output.
pub fn render_outcome(outcome: &PipelineOutcome) -> String {
    match outcome {
        PipelineOutcome::Answered { explanation, .. } => format!("\nAnswer:\n{explanation}\n"),
        PipelineOutcome::NarrationFailed { result, error, .. } => format!(
            "Error: Could not explain the results: {}\n\n{}",
            error.message(),
            format_results(result)
        ),
        PipelineOutcome::ExecutionFailed { error, .. } => format!("Error: {error}\n"),
        PipelineOutcome::Rejected { reason, .. } => format!("Error: {reason}\n"),
    }
}

/// Renders a question-level error (generation failed).
pub fn render_error(error: &BallerError) -> String {
    format!("Error: {}\n", error.message())
}

/// Runs the pipeline for one question and prints everything.
///
/// Returns whether the question was fully answered.
pub async fn answer(pipeline: &Pipeline, question: &str) -> bool {
    match pipeline.run(question, &ConsoleObserver).await {
        Ok(outcome) => {
            println!("{}", render_outcome(&outcome));
            outcome.is_answered()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Question failed");
            println!("{}", render_error(&e));
            false
        }
    }
}

/// Runs the interactive loop until an exit word or end of input.
pub async fn run_interactive(pipeline: &Pipeline) -> Result<()> {
    println!("{WELCOME}");

    let mut rl = DefaultEditor::new()
        .map_err(|e| BallerError::internal(format!("Failed to initialize line editor: {e}")))?;

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => match classify_input(&line) {
                InputAction::Exit => break,
                InputAction::Skip => continue,
                InputAction::Question(question) => {
                    let _ = rl.add_history_entry(question);
                    answer(pipeline, question).await;
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("Type 'quit' to exit.");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                return Err(BallerError::internal(format!("Failed to read input: {err}")));
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}
