//! Mock database client for testing.
//!
//! Returns canned results for known statements and records every statement
//! it is asked to run.

use super::{ColumnInfo, DatabaseBackend, DatabaseClient, QueryResult, Row};
use crate::error::{BallerError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Canned outcome for one statement.
#[derive(Debug, Clone)]
enum CannedOutcome {
    Rows(QueryResult),
    Error(String),
}

/// A mock database client that returns predefined results.
///
/// Statements are matched after trimming whitespace. Unknown statements fail
/// with a syntax-style error, like a real store would for text it can't run.
#[derive(Debug, Clone, Default)]
pub struct MockDatabaseClient {
    outcomes: Vec<(String, CannedOutcome)>,
    executed: Arc<Mutex<Vec<String>>>,
}

impl MockDatabaseClient {
    /// Creates a mock with no canned statements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers rows to return for `sql`.
    pub fn with_rows(mut self, sql: impl Into<String>, columns: &[&str], rows: Vec<Row>) -> Self {
        let columns = columns
            .iter()
            .map(|name| ColumnInfo::new(*name, "VARCHAR"))
            .collect();
        self.outcomes.push((
            sql.into().trim().to_string(),
            CannedOutcome::Rows(QueryResult::with_data(columns, rows)),
        ));
        self
    }

    /// Registers an error message to return for `sql`.
    pub fn with_error(mut self, sql: impl Into<String>, message: impl Into<String>) -> Self {
        self.outcomes.push((
            sql.into().trim().to_string(),
            CannedOutcome::Error(message.into()),
        ));
        self
    }

    /// Returns every statement executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|executed| executed.clone())
            .unwrap_or_default()
    }

    fn record(&self, sql: &str) {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(sql.to_string());
        }
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::MySql
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        self.record(sql);
        let key = sql.trim();

        match self.outcomes.iter().find(|(canned, _)| canned == key) {
            Some((_, CannedOutcome::Rows(result))) => Ok(result.clone()),
            Some((_, CannedOutcome::Error(message))) => Err(BallerError::query(message.clone())),
            None => Err(BallerError::query(format!(
                "You have an error in your SQL syntax near '{}'",
                key.chars().take(40).collect::<String>()
            ))),
        }
    }

    async fn execute_script(&self, statements: &[String]) -> Result<()> {
        for statement in statements {
            self.record(statement);
        }
        Ok(())
    }
}
