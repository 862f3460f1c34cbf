//! Statement guards.
//!
//! A guard sits between query generation and execution and may veto a
//! generated statement. By default no guard runs and every statement is
//! executed as generated; [`ReadOnlyGuard`] is the shipped opt-in guard.

mod parser;

pub use parser::{classify_sql, SqlClassifier};

use std::fmt;

/// Safety level classification for SQL queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafetyLevel {
    /// Read-only queries (SELECT, EXPLAIN, SHOW).
    Safe,
    /// Data modification queries (INSERT, UPDATE, REPLACE).
    Mutating,
    /// Data loss, schema or privilege changes, and anything unrecognized
    /// (DELETE, DROP, TRUNCATE, ALTER, CREATE, GRANT, REVOKE).
    Destructive,
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "Safe"),
            Self::Mutating => write!(f, "Mutating"),
            Self::Destructive => write!(f, "Destructive"),
        }
    }
}

/// The type of SQL statement detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementType {
    Select,
    Insert,
    Update,
    Delete,
    Drop,
    Truncate,
    Alter,
    Create,
    Grant,
    Revoke,
    Explain,
    Show,
    /// Multiple statements detected; contains the most dangerous type.
    Multiple(Box<StatementType>),
    /// Statement type could not be determined.
    Unknown,
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
            Self::Drop => write!(f, "DROP"),
            Self::Truncate => write!(f, "TRUNCATE"),
            Self::Alter => write!(f, "ALTER"),
            Self::Create => write!(f, "CREATE"),
            Self::Grant => write!(f, "GRANT"),
            Self::Revoke => write!(f, "REVOKE"),
            Self::Explain => write!(f, "EXPLAIN"),
            Self::Show => write!(f, "SHOW"),
            Self::Multiple(inner) => write!(f, "Multiple ({})", inner),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Result of classifying a SQL query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    /// The determined safety level.
    pub level: SafetyLevel,
    /// The type of statement(s) detected.
    pub statement_type: StatementType,
    /// Optional warning message for the user.
    pub warning: Option<String>,
}

impl ClassificationResult {
    /// Creates a new classification result.
    pub fn new(level: SafetyLevel, statement_type: StatementType) -> Self {
        Self {
            level,
            statement_type,
            warning: None,
        }
    }

    /// Creates a classification result with a warning message.
    pub fn with_warning(
        level: SafetyLevel,
        statement_type: StatementType,
        warning: impl Into<String>,
    ) -> Self {
        Self {
            level,
            statement_type,
            warning: Some(warning.into()),
        }
    }
}

/// Verdict of a statement guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Run the statement.
    Allow,
    /// Do not run the statement. Carries the reason shown to the user.
    Reject(String),
}

/// Hook that inspects a generated statement before it is executed.
pub trait StatementGuard: Send + Sync {
    /// Decides whether `sql` may be executed.
    fn check(&self, sql: &str) -> GuardDecision;
}

/// Allows only statements that classify as [`SafetyLevel::Safe`].
#[derive(Debug, Default)]
pub struct ReadOnlyGuard {
    classifier: SqlClassifier,
}

impl ReadOnlyGuard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatementGuard for ReadOnlyGuard {
    fn check(&self, sql: &str) -> GuardDecision {
        let classification = self.classifier.classify(sql);

        match classification.level {
            SafetyLevel::Safe => GuardDecision::Allow,
            level => {
                let mut reason = format!(
                    "Read-only mode: refusing to run a {} statement ({})",
                    classification.statement_type,
                    level.to_string().to_lowercase()
                );
                if let Some(warning) = classification.warning {
                    reason.push_str(&format!(". {warning}"));
                }
                tracing::warn!(statement_type = %classification.statement_type, %level, "Statement rejected");
                GuardDecision::Reject(reason)
            }
        }
    }
}
