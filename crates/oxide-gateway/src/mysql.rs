//! MySQL driver (feature `mysql`).
//!
//! Introspects with `SHOW COLUMNS FROM`, whose `Null` column is `YES`/`NO`
//! and whose `Key` column is `PRI`, `UNI`, `MUL` or empty. The result
//! columns of `SHOW` statements are reported with varying string and binary
//! types across server versions, so they are read as raw bytes.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use oxide_gateway_core::{BoundParam, BoundStatement, ColumnInfo, Row, SqlValue};
use sqlx::mysql::{MySql, MySqlArguments, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

use crate::config::GatewayConfig;
use crate::connection::{Connection, ExecOutcome};
use crate::error::Result;

/// A [`Connection`] backed by a `sqlx` MySQL pool.
#[derive(Debug, Clone)]
pub struct MySqlDriver {
    pool: MySqlPool,
}

impl MySqlDriver {
    /// Wraps an existing pool.
    #[must_use]
    pub const fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Opens a pool as described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an execution error if the server cannot be reached.
    pub async fn connect(config: &GatewayConfig) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

impl Connection for MySqlDriver {
    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let sql = format!("SHOW COLUMNS FROM {}", quote_identifier(table));
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<ColumnInfo> {
                Ok(ColumnInfo::from_show_columns(
                    text_column(row, "Field")?,
                    &text_column(row, "Null")?,
                    &text_column(row, "Key")?,
                ))
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
            last_insert_id: i64::try_from(result.last_insert_id()).ok(),
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
    format!("`{}`", name.replace('`', "``"))
}

fn text_column(row: &MySqlRow, column: &str) -> Result<String> {
    let bytes: Option<Vec<u8>> = row.try_get_unchecked(column)?;
    Ok(bytes
        .map(|b| String::from_utf8_lossy(&b).into_owned())
        .unwrap_or_default())
}

fn bind_param<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    param: &BoundParam,
) -> Query<'q, MySql, MySqlArguments> {
    match param {
        BoundParam::Null => query.bind(Option::<String>::None),
        BoundParam::Bool(b) => query.bind(*b),
        BoundParam::Int(n) => query.bind(*n),
        BoundParam::Str(s) => query.bind(s.clone()),
        BoundParam::Bytes(b) => query.bind(b.clone()),
    }
}

/// How a column is read back, chosen from its MySQL type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decoder {
    Bool,
    Signed,
    Unsigned,
    Float,
    Double,
    Date,
    Time,
    DateTime,
    Timestamp,
    Bytes,
    Text,
}

fn decoder_for(type_name: &str) -> Decoder {
    match type_name {
        "BOOLEAN" => Decoder::Bool,
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => Decoder::Signed,
        "YEAR" => Decoder::Unsigned,
        unsigned if unsigned.ends_with(" UNSIGNED") => Decoder::Unsigned,
        "FLOAT" => Decoder::Float,
        "DOUBLE" => Decoder::Double,
        "DATE" => Decoder::Date,
        "TIME" => Decoder::Time,
        "DATETIME" => Decoder::DateTime,
        "TIMESTAMP" => Decoder::Timestamp,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
        | "GEOMETRY" => Decoder::Bytes,
        // CHAR, VARCHAR, TEXT, DECIMAL, JSON, ENUM, SET arrive as text
        _ => Decoder::Text,
    }
}

fn unsigned_value(n: u64) -> SqlValue {
    i64::try_from(n).map_or_else(|_| SqlValue::Text(n.to_string()), SqlValue::Int)
}

fn decode_row(row: &MySqlRow) -> Result<Row> {
    let mut decoded = Row::new();

    for column in row.columns() {
        let index = column.ordinal();
        if row.try_get_raw(index)?.is_null() {
            decoded.push(column.name(), SqlValue::Null);
            continue;
        }

        let value = match decoder_for(column.type_info().name()) {
            Decoder::Bool => SqlValue::Bool(row.try_get(index)?),
            Decoder::Signed => SqlValue::Int(row.try_get(index)?),
            Decoder::Unsigned => unsigned_value(row.try_get_unchecked(index)?),
            Decoder::Float => SqlValue::Float(f64::from(row.try_get::<f32, _>(index)?)),
            Decoder::Double => SqlValue::Float(row.try_get(index)?),
            Decoder::Date => SqlValue::Text(row.try_get::<NaiveDate, _>(index)?.to_string()),
            Decoder::Time => SqlValue::Text(row.try_get::<NaiveTime, _>(index)?.to_string()),
            Decoder::DateTime => {
                SqlValue::Text(row.try_get::<NaiveDateTime, _>(index)?.to_string())
            }
            Decoder::Timestamp => SqlValue::Text(
                row.try_get::<DateTime<Utc>, _>(index)?
                    .naive_utc()
                    .to_string(),
            ),
            Decoder::Bytes => SqlValue::Blob(row.try_get_unchecked(index)?),
            Decoder::Text => {
                let bytes: Vec<u8> = row.try_get_unchecked(index)?;
                SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned())
            }
        };
        decoded.push(column.name(), value);
    }

    Ok(decoded)
}
