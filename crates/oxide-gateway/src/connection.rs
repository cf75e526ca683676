//! The boundary between the gateway and a database driver.

use std::sync::Arc;

use oxide_gateway_core::{BoundStatement, ColumnInfo, Row};

use crate::error::Result;

/// What a driver reports after executing a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecOutcome {
    /// Number of rows the statement changed.
    pub rows_affected: u64,
    /// Identifier assigned by the engine to the last inserted row.
    pub last_insert_id: Option<i64>,
}

/// A live database connection.
///
/// Drivers in this crate wrap a `sqlx` pool; tests use in-memory fakes.
#[allow(async_fn_in_trait)]
pub trait Connection {
    /// Introspects `table`, returning its columns in table order.
    ///
    /// An unknown table may be reported either as an error or as an empty
    /// column list; the schema cache treats both as a schema fetch failure.
    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>>;

    /// Executes a statement with its bound parameters.
    async fn execute(&self, statement: &BoundStatement) -> Result<ExecOutcome>;

    /// Runs raw SQL and returns every row.
    async fn query(&self, sql: &str) -> Result<Vec<Row>>;

    /// Runs raw SQL and returns the first row, if any.
    async fn query_first(&self, sql: &str) -> Result<Option<Row>> {
        Ok(self.query(sql).await?.into_iter().next())
    }
}

impl<C: Connection> Connection for Arc<C> {
    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        (**self).describe_table(table).await
    }

    async fn execute(&self, statement: &BoundStatement) -> Result<ExecOutcome> {
        (**self).execute(statement).await
    }

    async fn query(&self, sql: &str) -> Result<Vec<Row>> {
        (**self).query(sql).await
    }

    async fn query_first(&self, sql: &str) -> Result<Option<Row>> {
        (**self).query_first(sql).await
    }
}
