//! Integration tests for BallerSQL.

pub mod mysql_test;
pub mod pipeline_test;
pub mod seed_test;
pub mod sqlite_test;

use ballersql::config::ConnectionConfig;
use ballersql::db::{self, seed, DatabaseClient};
use tempfile::TempDir;

/// Creates a seeded SQLite league in a temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the client is used.
pub async fn seeded_sqlite() -> (TempDir, Box<dyn DatabaseClient>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("league.db");
    let client = db::create_client(&ConnectionConfig::sqlite(path.to_string_lossy())).unwrap();

    seed::create_tables(client.as_ref()).await.unwrap();
    seed::insert_sample_data(client.as_ref()).await.unwrap();

    (dir, client)
}
