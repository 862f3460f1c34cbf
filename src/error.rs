//! Error types for BallerSQL.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Every failure BallerSQL reports, one variant per stage that can fail.
#[derive(Error, Debug)]
pub enum BallerError {
    /// The league database could not be reached: server down, credentials
    /// refused, unknown database, or an SQLite file that cannot be opened.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The store rejected a statement, generated or part of a setup script.
    #[error("Query error: {0}")]
    Query(String),

    /// The completion service failed while generating SQL or explaining rows.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Bad config file, connection string, or a missing API key or database.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Line editor failures, blank questions, and result shapes we can't read.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BallerError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an LLM error with the given message.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Llm(_) => "LLM Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns the bare message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Connection(msg)
            | Self::Query(msg)
            | Self::Llm(msg)
            | Self::Config(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

/// Result type alias using BallerError.
pub type Result<T> = std::result::Result<T, BallerError>;
