//! Database abstraction layer for BallerSQL.
//!
//! Provides a trait-based interface for database operations, allowing
//! different database backends to be used interchangeably. Clients hold
//! connection parameters only; every call opens and closes its own connection.

mod mock;
mod mysql;
pub mod seed;
mod sqlite;
mod types;

pub use mock::MockDatabaseClient;
pub use mysql::MySqlClient;
pub use sqlite::SqliteClient;
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Error message for text that holds more than one statement.
pub const MULTIPLE_STATEMENTS: &str =
    "Multiple statements are not supported. Send one statement at a time.";

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    MySql,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Self::MySql),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Returns the default port for this backend.
    pub fn default_port(&self) -> u16 {
        match self {
            Self::MySql => 3306,
            Self::Sqlite => 0,
        }
    }
}

/// Creates a database client for the given backend and configuration.
///
/// This is the central factory function for database access. No connection
/// is opened here; see [`DatabaseClient::ping`] for an up-front check.
pub fn create_client(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    match config.backend {
        DatabaseBackend::MySql => Ok(Box::new(MySqlClient::new(config)?)),
        DatabaseBackend::Sqlite => Ok(Box::new(SqliteClient::new(config)?)),
    }
}

/// Trait defining the interface for database clients.
///
/// Each method acquires a fresh connection and releases it before returning,
/// on success and on error alike.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Returns the backend this client talks to.
    fn backend(&self) -> DatabaseBackend;

    /// Opens and closes a connection to verify the parameters.
    async fn ping(&self) -> Result<()>;

    /// Executes a single SQL statement verbatim and materializes all rows.
    ///
    /// Text holding more than one statement is an error and nothing from it
    /// is kept.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult>;

    /// Executes several statements on one connection inside a transaction.
    async fn execute_script(&self, statements: &[String]) -> Result<()>;
}
