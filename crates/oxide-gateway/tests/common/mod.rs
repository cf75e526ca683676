#![allow(dead_code)]

use oxide_gateway::{RecordGateway, SqliteDriver};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

pub const PEOPLE_DDL: &str = "CREATE TABLE people (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name VARCHAR(75) NULL DEFAULT NULL,
    last_name VARCHAR(75) NULL DEFAULT NULL
)";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Single-connection in-memory database; every pooled connection to
/// `:memory:` would otherwise see its own empty database.
pub async fn memory_pool() -> SqlitePool {
    init_tracing();
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool")
}

pub async fn file_pool(path: &Path, max_connections: u32) -> SqlitePool {
    init_tracing();
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .unwrap_or_else(|e| panic!("Failed to open {}: {e}", path.display()))
}

pub async fn exec(pool: &SqlitePool, sql: &str) {
    sqlx::query(sql)
        .execute(pool)
        .await
        .unwrap_or_else(|e| panic!("Failed to execute: {sql}\nError: {e}"));
}

pub async fn people_gateway() -> RecordGateway<SqliteDriver> {
    let pool = memory_pool().await;
    exec(&pool, PEOPLE_DDL).await;
    RecordGateway::new(SqliteDriver::new(pool))
}
