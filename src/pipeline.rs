//! The question pipeline: generate SQL, optionally guard it, execute it, and
//! narrate the result.
//!
//! Each call to [`Pipeline::run`] is one forward pass with no retries and no
//! state carried over from earlier questions. Only a generation failure is an
//! `Err`; everything after that is reported through [`PipelineOutcome`].

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::db::{DatabaseClient, QueryResult};
use crate::error::{BallerError, Result};
use crate::llm::{LlmClient, QueryGenerator, ResultNarrator};
use crate::query::{ExecutionOutcome, QueryExecutor};
use crate::safety::{GuardDecision, StatementGuard};

/// Progress notifications emitted while a question is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent<'a> {
    /// SQL generation is about to start.
    Generating,
    /// SQL has been generated.
    Generated { sql: &'a str },
    /// The statement is about to be executed.
    Executing,
    /// The statement ran and returned this many rows.
    Executed { row_count: usize },
    /// Narration is about to start.
    Narrating,
}

/// Receives pipeline progress, e.g. to print status lines.
pub trait PipelineObserver {
    fn on_event(&self, event: PipelineEvent<'_>);
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_event(&self, _event: PipelineEvent<'_>) {}
}

/// How a question ended, once SQL was generated.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Every stage succeeded.
    Answered {
        sql: String,
        result: QueryResult,
        explanation: String,
    },
    /// The statement ran but the explanation could not be produced.
    NarrationFailed {
        sql: String,
        result: QueryResult,
        error: BallerError,
    },
    /// The store rejected the statement. Narration was skipped.
    ExecutionFailed { sql: String, error: String },
    /// A statement guard vetoed the statement. Nothing was executed.
    Rejected { sql: String, reason: String },
}

impl PipelineOutcome {
    /// Returns the generated statement.
    pub fn sql(&self) -> &str {
        match self {
            Self::Answered { sql, .. }
            | Self::NarrationFailed { sql, .. }
            | Self::ExecutionFailed { sql, .. }
            | Self::Rejected { sql, .. } => sql,
        }
    }

    /// Returns the executed result set, if the statement ran.
    pub fn result(&self) -> Option<&QueryResult> {
        match self {
            Self::Answered { result, .. } | Self::NarrationFailed { result, .. } => Some(result),
            Self::ExecutionFailed { .. } | Self::Rejected { .. } => None,
        }
    }

    /// Returns true if every stage succeeded.
    pub fn is_answered(&self) -> bool {
        matches!(self, Self::Answered { .. })
    }
}

/// Generator, optional guard, executor and narrator wired together.
pub struct Pipeline {
    generator: QueryGenerator,
    narrator: ResultNarrator,
    db: Box<dyn DatabaseClient>,
    guard: Option<Box<dyn StatementGuard>>,
}

impl Pipeline {
    /// Creates a pipeline with default temperatures and no guard.
    pub fn new(llm: Arc<dyn LlmClient>, db: Box<dyn DatabaseClient>) -> Self {
        Self {
            generator: QueryGenerator::new(Arc::clone(&llm)),
            narrator: ResultNarrator::new(llm),
            db,
            guard: None,
        }
    }

    /// Creates a pipeline using the temperatures from `config`.
    pub fn from_config(
        llm: Arc<dyn LlmClient>,
        db: Box<dyn DatabaseClient>,
        config: &LlmConfig,
    ) -> Self {
        Self {
            generator: QueryGenerator::new(Arc::clone(&llm))
                .with_temperature(config.generation_temperature),
            narrator: ResultNarrator::new(llm).with_temperature(config.narration_temperature),
            db,
            guard: None,
        }
    }

    /// Installs a guard that runs between generation and execution.
    pub fn with_guard(mut self, guard: Box<dyn StatementGuard>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Returns the database client.
    pub fn database(&self) -> &dyn DatabaseClient {
        self.db.as_ref()
    }

    /// Runs the pipeline once without progress reporting.
    pub async fn ask(&self, question: &str) -> Result<PipelineOutcome> {
        self.run(question, &NoopObserver).await
    }

    /// Runs the pipeline once for `question`.
    pub async fn run(
        &self,
        question: &str,
        observer: &dyn PipelineObserver,
    ) -> Result<PipelineOutcome> {
        observer.on_event(PipelineEvent::Generating);
        let sql = self.generator.generate(question).await?;
        observer.on_event(PipelineEvent::Generated { sql: &sql });

        if let Some(guard) = &self.guard {
            if let GuardDecision::Reject(reason) = guard.check(&sql) {
                return Ok(PipelineOutcome::Rejected { sql, reason });
            }
        }

        observer.on_event(PipelineEvent::Executing);
        let result = match QueryExecutor::new(self.db.as_ref()).execute(&sql).await {
            ExecutionOutcome::Success(result) => result,
            ExecutionOutcome::Failure(error) => {
                return Ok(PipelineOutcome::ExecutionFailed { sql, error });
            }
        };
        observer.on_event(PipelineEvent::Executed {
            row_count: result.row_count,
        });

        observer.on_event(PipelineEvent::Narrating);
        match self.narrator.narrate(question, &sql, &result).await {
            Ok(explanation) => Ok(PipelineOutcome::Answered {
                sql,
                result,
                explanation,
            }),
            Err(error) => {
                tracing::warn!(error = %error, "Narration failed; returning rows without explanation");
                Ok(PipelineOutcome::NarrationFailed { sql, result, error })
            }
        }
    }
}
