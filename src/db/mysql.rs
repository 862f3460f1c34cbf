//! MySQL database client implementation.
//!
//! Provides the `MySqlClient` struct that implements the `DatabaseClient` trait
//! for MySQL and MariaDB servers using sqlx. Statements are sent exactly as
//! given, with no parameters and no rewriting, over the prepared-statement
//! protocol, which only accepts one statement per call.

use crate::config::ConnectionConfig;
use crate::db::{ColumnInfo, DatabaseBackend, DatabaseClient, QueryResult, Row, Value};
use crate::error::{BallerError, Result};
use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlConnectOptions, MySqlConnection, MySqlDatabaseError, MySqlRow};
use sqlx::{
    Column as SqlxColumn, ConnectOptions, Connection, Executor, Row as SqlxRow, Statement,
    TypeInfo, ValueRef,
};
use std::time::Instant;
use tracing::{debug, warn};

/// MySQL database client.
///
/// Holds connection parameters only. Each operation opens its own connection
/// and closes it before returning.
#[derive(Debug, Clone)]
pub struct MySqlClient {
    options: MySqlConnectOptions,
    config: ConnectionConfig,
}

impl MySqlClient {
    /// Creates a client from a connection config without connecting.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let database = config.require_database()?;

        let mut options = MySqlConnectOptions::new()
            .host(config.host.as_deref().unwrap_or("localhost"))
            .port(config.port)
            .database(database);

        if let Some(user) = &config.user {
            options = options.username(user);
        }
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        Ok(Self {
            options,
            config: config.clone(),
        })
    }

    async fn open(&self) -> Result<MySqlConnection> {
        debug!("Opening MySQL connection to {}", self.config.display_string());
        self.options
            .connect()
            .await
            .map_err(|e| map_connection_error(e, &self.config))
    }
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::MySql
    }

    async fn ping(&self) -> Result<()> {
        let conn = self.open().await?;
        release(conn).await;
        Ok(())
    }

    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let mut conn = self.open().await?;
        let result = run_statement(&mut conn, sql).await;
        release(conn).await;
        result
    }

    async fn execute_script(&self, statements: &[String]) -> Result<()> {
        let mut conn = self.open().await?;
        let result = run_script(&mut conn, statements).await;
        release(conn).await;
        result
    }
}

/// Runs one statement and materializes every row.
///
/// The server rejects text with a second statement before running any of it.
async fn run_statement(conn: &mut MySqlConnection, sql: &str) -> Result<QueryResult> {
    let start = Instant::now();

    let rows: Vec<MySqlRow> = sqlx::query(sql)
        .persistent(false)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| BallerError::query(format_query_error(e)))?;

    let execution_time = start.elapsed();

    // Column metadata comes from the first row; empty results need a describe
    let columns: Vec<ColumnInfo> = match rows.first() {
        Some(first_row) => first_row
            .columns()
            .iter()
            .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
            .collect(),
        None => fetch_column_metadata(conn, sql).await,
    };

    let rows: Vec<Row> = rows.iter().map(convert_row).collect();

    Ok(QueryResult::with_data(columns, rows).with_execution_time(execution_time))
}

/// Prepares the statement (without executing it) to read its result columns.
///
/// Statements without a result descriptor, or that MySQL refuses to prepare,
/// yield no columns.
async fn fetch_column_metadata(conn: &mut MySqlConnection, sql: &str) -> Vec<ColumnInfo> {
    match (&mut *conn).prepare(sql).await {
        Ok(statement) => statement
            .columns()
            .iter()
            .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
            .collect(),
        Err(e) => {
            debug!("Could not describe statement for column metadata: {}", e);
            Vec::new()
        }
    }
}

/// Runs statements in order inside one transaction.
async fn run_script(conn: &mut MySqlConnection, statements: &[String]) -> Result<()> {
    let mut tx = conn
        .begin()
        .await
        .map_err(|e| BallerError::query(format_query_error(e)))?;

    for statement in statements {
        (&mut *tx)
            .execute(sqlx::raw_sql(statement))
            .await
            .map_err(|e| BallerError::query(format_query_error(e)))?;
    }

    tx.commit()
        .await
        .map_err(|e| BallerError::query(format_query_error(e)))
}

/// Closes a connection, logging rather than failing if the close itself fails.
async fn release(conn: MySqlConnection) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close MySQL connection cleanly: {}", e);
    }
}

/// Converts a sqlx MySqlRow to our Row type.
fn convert_row(row: &MySqlRow) -> Row {
    (0..row.columns().len())
        .map(|i| convert_value(row, i))
        .collect()
}

fn decode<'r, T>(row: &'r MySqlRow, index: usize) -> Option<T>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get::<Option<T>, _>(index).ok().flatten()
}

/// Converts a single column value from a MySqlRow to our Value type.
fn convert_value(row: &MySqlRow, index: usize) -> Value {
    let type_name = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return Value::Null,
    };

    match type_name.as_str() {
        "BOOLEAN" => decode::<bool>(row, index).map(Value::Bool),

        name if name.ends_with("UNSIGNED") => decode::<u64>(row, index).map(|v| {
            i64::try_from(v)
                .map(Value::Int)
                .unwrap_or_else(|_| Value::String(v.to_string()))
        }),

        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            decode::<i64>(row, index).map(Value::Int)
        }

        "FLOAT" => decode::<f32>(row, index).map(|v| Value::Float(widen_f32(v))),

        "DOUBLE" => decode::<f64>(row, index).map(Value::Float),

        "DATE" => decode::<chrono::NaiveDate>(row, index).map(|d| Value::String(d.to_string())),

        "DATETIME" => decode::<chrono::NaiveDateTime>(row, index)
            .map(|d| Value::String(d.format("%Y-%m-%d %H:%M:%S").to_string())),

        "TIMESTAMP" => decode::<chrono::DateTime<chrono::Utc>>(row, index)
            .map(|d| Value::String(d.format("%Y-%m-%d %H:%M:%S").to_string())),

        "TIME" => decode::<chrono::NaiveTime>(row, index).map(|t| Value::String(t.to_string())),

        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => {
            decode::<Vec<u8>>(row, index).map(Value::Bytes)
        }

        // DECIMAL, ENUM, JSON, text types and anything else: read the raw text
        _ => decode::<String>(row, index).or_else(|| {
            row.try_get_unchecked::<Option<String>, _>(index)
                .ok()
                .flatten()
        }).map(Value::String),
    }
    .unwrap_or(Value::Null)
}

/// Widens through the shortest decimal form, so 1.1f32 stays 1.1.
fn widen_f32(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(f64::from(value))
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> BallerError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("root");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        BallerError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("access denied") {
        BallerError::connection(format!(
            "Access denied for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("unknown database") {
        BallerError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        BallerError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        BallerError::connection(error.to_string())
    }
}

/// Formats a query error in the familiar `ERROR <code> (<state>): <message>` shape.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    match db_error.try_downcast_ref::<MySqlDatabaseError>() {
        Some(mysql_error) => match mysql_error.code() {
            Some(state) => format!(
                "ERROR {} ({}): {}",
                mysql_error.number(),
                state,
                mysql_error.message()
            ),
            None => format!("ERROR {}: {}", mysql_error.number(), mysql_error.message()),
        },
        None => format!("ERROR: {}", db_error.message()),
    }
}
