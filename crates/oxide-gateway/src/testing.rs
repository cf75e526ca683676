//! In-memory connection for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use oxide_gateway_core::{BoundStatement, ColumnInfo, KeyRole, Row};

use crate::connection::{Connection, ExecOutcome};
use crate::error::{GatewayError, Result};

/// Records every statement it is asked to execute and counts
/// introspection queries.
#[derive(Debug, Default)]
pub struct FakeConnection {
    tables: HashMap<String, Vec<ColumnInfo>>,
    rows: Vec<Row>,
    fail_describe: bool,
    describes: AtomicUsize,
    queries: AtomicUsize,
    last_id: AtomicI64,
    executed: Mutex<Vec<BoundStatement>>,
}

impl FakeConnection {
    /// `people(id PK, first_name nullable, last_name nullable)`.
    pub fn people() -> Self {
        Self::default().with_table(
            "people",
            vec![
                ColumnInfo::new("id", false, KeyRole::Primary),
                ColumnInfo::new("first_name", true, KeyRole::None),
                ColumnInfo::new("last_name", true, KeyRole::None),
            ],
        )
    }

    pub fn with_table(mut self, table: &str, columns: Vec<ColumnInfo>) -> Self {
        self.tables.insert(table.to_string(), columns);
        self
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    pub fn failing_describe(mut self) -> Self {
        self.fail_describe = true;
        self
    }

    pub fn describes(&self) -> usize {
        self.describes.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> Vec<BoundStatement> {
        self.executed.lock().unwrap().clone()
    }
}

impl Connection for FakeConnection {
    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        self.describes.fetch_add(1, Ordering::SeqCst);
        // let concurrent callers interleave
        tokio::task::yield_now().await;

        if self.fail_describe {
            return Err(GatewayError::Execution(sqlx::Error::Protocol(format!(
                "table {table} is locked"
            ))));
        }
        Ok(self.tables.get(table).cloned().unwrap_or_default())
    }

    async fn execute(&self, statement: &BoundStatement) -> Result<ExecOutcome> {
        statement.to_positional()?;
        self.executed.lock().unwrap().push(statement.clone());
        Ok(ExecOutcome {
            rows_affected: 1,
            last_insert_id: Some(self.last_id.fetch_add(1, Ordering::SeqCst) + 1),
        })
    }

    async fn query(&self, _sql: &str) -> Result<Vec<Row>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.clone())
    }
}
