//! Query execution.
//!
//! Runs a generated statement exactly once against the store and folds every
//! error into the outcome, so nothing past this boundary sees an `Err`.

use std::time::Instant;

use crate::db::{DatabaseClient, QueryResult};

/// Outcome of executing one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// The statement ran; the result may have zero rows or zero columns.
    Success(QueryResult),
    /// The statement could not be run. Carries the store's message.
    Failure(String),
}

impl ExecutionOutcome {
    /// Returns true if the statement ran.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the result set, if any.
    pub fn result(&self) -> Option<&QueryResult> {
        match self {
            Self::Success(result) => Some(result),
            Self::Failure(_) => None,
        }
    }

    /// Returns the failure message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(message) => Some(message),
        }
    }
}

/// Query executor over a database client.
///
/// The statement is sent verbatim: no parameters, no rewriting, no sandbox.
/// Mutating statements take effect.
pub struct QueryExecutor<'a> {
    db: &'a dyn DatabaseClient,
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new query executor.
    pub fn new(db: &'a dyn DatabaseClient) -> Self {
        Self { db }
    }

    /// Executes `sql` once and reports what happened.
    pub async fn execute(&self, sql: &str) -> ExecutionOutcome {
        let start = Instant::now();
        let result = self.db.execute_query(sql).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(query_result) => {
                tracing::info!(
                    rows = query_result.row_count,
                    columns = query_result.columns.len(),
                    elapsed_ms,
                    "Query executed"
                );
                ExecutionOutcome::Success(query_result)
            }
            Err(e) => {
                tracing::warn!(elapsed_ms, error = %e, "Query failed");
                ExecutionOutcome::Failure(e.message().to_string())
            }
        }
    }
}
