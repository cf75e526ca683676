//! The record gateway: schema-aware inserts and updates plus raw reads.

use std::sync::Arc;

use oxide_gateway_core::{
    bind_all, insert_sql, match_fields, unknown_fields, update_sql, BoundStatement, FieldPlan,
    MatchedRecord, Record, Row, SqlValue, TableSchema, ToSqlValue,
};
use tracing::{debug, warn};

use crate::cache::SchemaCache;
use crate::connection::Connection;
use crate::error::{GatewayError, Result};

/// Inserts and updates loosely-typed records into any table.
///
/// The gateway looks up each table's columns once, drops record keys that
/// are not columns, and binds the rest as named parameters.
///
/// # Example
///
/// ```rust,ignore
/// use oxide_gateway::{record, RecordGateway, SqliteDriver, GatewayConfig};
///
/// let driver = SqliteDriver::connect(&GatewayConfig::from_env()?).await?;
/// let gateway = RecordGateway::new(driver);
///
/// let id = gateway
///     .insert("people", &record! { "first_name" => "Chad", "last_name" => "Burke" })
///     .await?;
///
/// gateway
///     .update("people", &record! { "first_name" => "Brian" }, id)
///     .await?;
///
/// let name = gateway
///     .fetch_scalar(&format!("select first_name from people where id = {id}"))
///     .await?;
/// ```
#[derive(Debug)]
pub struct RecordGateway<C> {
    connection: C,
    schemas: Arc<SchemaCache>,
}

impl<C: Connection> RecordGateway<C> {
    /// Creates a gateway with its own schema cache.
    pub fn new(connection: C) -> Self {
        Self::with_cache(connection, Arc::new(SchemaCache::new()))
    }

    /// Creates a gateway that shares `schemas` with other gateways.
    pub fn with_cache(connection: C, schemas: Arc<SchemaCache>) -> Self {
        Self {
            connection,
            schemas,
        }
    }

    /// Returns the underlying connection.
    pub const fn connection(&self) -> &C {
        &self.connection
    }

    /// Returns the schema cache.
    pub const fn cache(&self) -> &Arc<SchemaCache> {
        &self.schemas
    }

    /// Returns the schema of `table`, introspecting it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SchemaFetch`] if the table does not exist.
    pub async fn schema(&self, table: &str) -> Result<Arc<TableSchema>> {
        self.schemas.resolve(&self.connection, table).await
    }

    /// Inserts `record` into `table` and returns the identifier the engine
    /// assigned to the new row (0 if it assigned none).
    ///
    /// Record keys that are not columns of `table` are ignored; a null or
    /// empty value is stored as NULL in a nullable column and as the empty
    /// string otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SchemaFetch`] for an unknown table and an
    /// execution error if the driver rejects the statement.
    pub async fn insert(&self, table: &str, record: &Record) -> Result<i64> {
        let schema = self.schema(table).await?;
        let (matched, plan) = match_record(record, &schema);

        let mut statement = BoundStatement::new(insert_sql(table, &plan));
        bind_all(&mut statement, &matched);

        debug!(table = %table, sql = %statement.sql(), "Executing insert");
        let outcome = self.connection.execute(&statement).await?;

        Ok(outcome.last_insert_id.unwrap_or_default())
    }

    /// Updates the row of `table` whose primary key equals `id`.
    ///
    /// Only the columns present in `record` are written; absent columns are
    /// left untouched. Updating an id that does not exist changes nothing
    /// and is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingPrimaryKey`] before any SQL runs if
    /// the table has no primary key, [`GatewayError::SchemaFetch`] for an
    /// unknown table, and an execution error if the driver rejects the
    /// statement.
    pub async fn update(&self, table: &str, record: &Record, id: impl ToSqlValue) -> Result<()> {
        let schema = self.schema(table).await?;
        let Some(primary_key) = schema.primary_key() else {
            warn!(table = %table, "Refusing update on table without primary key");
            return Err(GatewayError::MissingPrimaryKey(table.to_string()));
        };
        let (matched, plan) = match_record(record, &schema);

        let mut statement = BoundStatement::new(update_sql(table, &plan, primary_key));
        // Matched fields bind after the id: a record carrying the primary
        // key column overrides `id`.
        statement.bind(primary_key, &id.to_sql_value());
        bind_all(&mut statement, &matched);

        debug!(table = %table, sql = %statement.sql(), "Executing update");
        let outcome = self.connection.execute(&statement).await?;
        debug!(
            table = %table,
            rows_affected = outcome.rows_affected,
            "Update executed"
        );

        Ok(())
    }

    /// Runs raw SQL and returns every row.
    ///
    /// The SQL is sent as-is, without parameters: the caller is responsible
    /// for what it contains.
    ///
    /// # Errors
    ///
    /// Returns an execution error if the query fails.
    pub async fn fetch_all(&self, sql: &str) -> Result<Vec<Row>> {
        debug!(sql = %sql, "Fetching all rows");
        self.connection.query(sql).await
    }

    /// Runs raw SQL and returns the first row, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns an execution error if the query fails.
    pub async fn fetch_one(&self, sql: &str) -> Result<Option<Row>> {
        debug!(sql = %sql, "Fetching one row");
        self.connection.query_first(sql).await
    }

    /// Runs raw SQL and returns the first column of the first row, or
    /// `None` if there is no row.
    ///
    /// # Errors
    ///
    /// Returns an execution error if the query fails.
    pub async fn fetch_scalar(&self, sql: &str) -> Result<Option<SqlValue>> {
        debug!(sql = %sql, "Fetching scalar");
        Ok(self
            .connection
            .query_first(sql)
            .await?
            .and_then(Row::into_first))
    }
}

fn match_record(record: &Record, schema: &TableSchema) -> (MatchedRecord, FieldPlan) {
    let ignored = unknown_fields(record, schema);
    if !ignored.is_empty() {
        debug!(table = %schema.table(), ignored = ?ignored, "Ignoring fields that are not columns");
    }
    match_fields(record, schema)
}
