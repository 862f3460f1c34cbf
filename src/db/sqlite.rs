//! SQLite database client implementation.
//!
//! Mirrors the MySQL client for local database files: one connection per
//! call, statements executed verbatim, rows fully materialized.

use crate::config::ConnectionConfig;
use crate::db::{
    ColumnInfo, DatabaseBackend, DatabaseClient, QueryResult, Row, Value, MULTIPLE_STATEMENTS,
};
use crate::error::{BallerError, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{
    Column as SqlxColumn, ConnectOptions, Connection, Either, Executor, Row as SqlxRow, Statement,
    TypeInfo, ValueRef,
};
use std::time::Instant;
use tracing::{debug, warn};

/// SQLite database client backed by a file on disk.
#[derive(Debug, Clone)]
pub struct SqliteClient {
    options: SqliteConnectOptions,
    path: String,
}

impl SqliteClient {
    /// Creates a client for the file named by `config.database`.
    ///
    /// The file is created on first connection if it does not exist.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let path = config.require_database()?.to_string();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);

        Ok(Self { options, path })
    }

    async fn open(&self) -> Result<SqliteConnection> {
        debug!("Opening SQLite database {}", self.path);
        self.options.connect().await.map_err(|e| {
            BallerError::connection(format!("Cannot open SQLite database '{}': {e}", self.path))
        })
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Sqlite
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

/// Runs exactly one statement and materializes its rows.
///
/// SQLite will happily run every statement in a string, so the statement runs
/// inside a transaction that is rolled back as soon as a second statement
/// shows up.
async fn run_statement(conn: &mut SqliteConnection, sql: &str) -> Result<QueryResult> {
    let start = Instant::now();
    let mut tx = conn.begin().await.map_err(query_error)?;

    let mut rows: Vec<SqliteRow> = Vec::new();
    let mut statements = 0usize;
    {
        let mut results = sqlx::raw_sql(sql).fetch_many(&mut *tx);
        while let Some(item) = results.try_next().await.map_err(query_error)? {
            match item {
                Either::Right(row) if statements == 0 => rows.push(row),
                // First statement finished, or anything after it
                _ => statements += 1,
            }
            if statements > 1 {
                break;
            }
        }
    }

    if statements > 1 {
        tx.rollback().await.map_err(query_error)?;
        return Err(BallerError::query(MULTIPLE_STATEMENTS));
    }
    tx.commit().await.map_err(query_error)?;

    let execution_time = start.elapsed();

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

async fn fetch_column_metadata(conn: &mut SqliteConnection, sql: &str) -> Vec<ColumnInfo> {
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

async fn run_script(conn: &mut SqliteConnection, statements: &[String]) -> Result<()> {
    let mut tx = conn.begin().await.map_err(query_error)?;

    for statement in statements {
        (&mut *tx)
            .execute(sqlx::raw_sql(statement))
            .await
            .map_err(query_error)?;
    }

    tx.commit().await.map_err(query_error)
}

async fn release(conn: SqliteConnection) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close SQLite connection cleanly: {}", e);
    }
}

fn convert_row(row: &SqliteRow) -> Row {
    (0..row.columns().len())
        .map(|i| convert_value(row, i))
        .collect()
}

fn decode<'r, T>(row: &'r SqliteRow, index: usize) -> Option<T>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    row.try_get::<Option<T>, _>(index).ok().flatten()
}

/// Converts a value using its storage class rather than the declared type,
/// since expression columns carry no declared type in SQLite.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let type_name = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return Value::Null,
    };

    let value = match type_name.as_str() {
        "INTEGER" => decode::<i64>(row, index).map(Value::Int),
        "REAL" => decode::<f64>(row, index).map(Value::Float),
        "BOOLEAN" => decode::<bool>(row, index).map(Value::Bool),
        "BLOB" => decode::<Vec<u8>>(row, index).map(Value::Bytes),
        _ => None,
    };

    value
        .or_else(|| {
            row.try_get_unchecked::<Option<String>, _>(index)
                .ok()
                .flatten()
                .map(Value::String)
        })
        .unwrap_or(Value::Null)
}

fn query_error(error: sqlx::Error) -> BallerError {
    BallerError::query(format_query_error(error))
}

fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => format!("ERROR: {}", db_error.message()),
        None => error.to_string(),
    }
}
