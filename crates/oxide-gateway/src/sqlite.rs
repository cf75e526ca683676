//! SQLite driver.
//!
//! Introspects with `PRAGMA table_info`, which reports `notnull` and the
//! 1-based position of a column in the primary key (`pk`, 0 if none).
//! Values are decoded by their runtime storage class, so a column declared
//! `VARCHAR(75)` still comes back as text and `INTEGER` as an integer.

use oxide_gateway_core::{BoundParam, BoundStatement, ColumnInfo, KeyRole, Row, SqlValue};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

use crate::config::GatewayConfig;
use crate::connection::{Connection, ExecOutcome};
use crate::error::Result;

/// A [`Connection`] backed by a `sqlx` SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteDriver {
    pool: SqlitePool,
}

impl SqliteDriver {
    /// Wraps an existing pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool as described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an execution error if the database cannot be opened.
    pub async fn connect(config: &GatewayConfig) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl Connection for SqliteDriver {
    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let sql = format!("PRAGMA table_info({})", quote_identifier(table));
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<ColumnInfo> {
                let name: String = row.try_get("name")?;
                let not_null: i64 = row.try_get("notnull")?;
                let pk: i64 = row.try_get("pk")?;
                let key = if pk > 0 {
                    KeyRole::Primary
                } else {
                    KeyRole::None
                };
                Ok(ColumnInfo::new(name, not_null == 0, key))
            })
            .collect()
    }

    async fn execute(&self, statement: &BoundStatement) -> Result<ExecOutcome> {
        let (sql, params) = statement.to_positional()?;

        let mut query = sqlx::query(&sql);
        for param in params {
            query = bind_param(query, param);
        }

        let result = query.execute(&self.pool).await?;
        Ok(ExecOutcome {
            rows_affected: result.rows_affected(),
            last_insert_id: Some(result.last_insert_rowid()),
        })
    }

    async fn query(&self, sql: &str) -> Result<Vec<Row>> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn query_first(&self, sql: &str) -> Result<Option<Row>> {
        let row = sqlx::query(sql).fetch_optional(&self.pool).await?;
        row.as_ref().map(decode_row).transpose()
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Binds a parameter by its storage kind.
fn bind_param<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    param: &BoundParam,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match param {
        BoundParam::Null => query.bind(Option::<String>::None),
        BoundParam::Bool(b) => query.bind(*b),
        BoundParam::Int(n) => query.bind(*n),
        BoundParam::Str(s) => query.bind(s.clone()),
        BoundParam::Bytes(b) => query.bind(b.clone()),
    }
}

fn decode_row(row: &SqliteRow) -> Result<Row> {
    let mut decoded = Row::new();

    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;

        let value = if raw.is_null() {
            SqlValue::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" => SqlValue::Int(row.try_get(index)?),
                "REAL" => SqlValue::Float(row.try_get(index)?),
                "BLOB" => SqlValue::Blob(row.try_get(index)?),
                _ => SqlValue::Text(row.try_get(index)?),
            }
        };
        decoded.push(column.name(), value);
    }

    Ok(decoded)
}
