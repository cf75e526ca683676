//! Per-table schema cache.
//!
//! Each table gets a once-cell slot. The first caller for a table runs the
//! introspection query while concurrent callers for the same table wait on
//! the slot; other tables are not blocked. Populated entries are never
//! refreshed: the schema is assumed fixed for the cache's lifetime.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use oxide_gateway_core::TableSchema;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::connection::Connection;
use crate::error::{GatewayError, Result};

type Slot = Arc<OnceCell<Arc<TableSchema>>>;

/// Table name to introspected schema.
///
/// Owned by a [`RecordGateway`](crate::RecordGateway), or shared between
/// gateways through an `Arc`.
#[derive(Debug, Default)]
pub struct SchemaCache {
    tables: RwLock<HashMap<String, Slot>>,
}

impl SchemaCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the schema of `table`, introspecting it through `conn` on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SchemaFetch`] if the introspection query
    /// fails or reports no columns. Nothing is cached in that case, so a
    /// later call queries again.
    pub async fn resolve<C: Connection>(&self, conn: &C, table: &str) -> Result<Arc<TableSchema>> {
        let slot = self.slot(table);
        match slot.get_or_try_init(|| fetch_schema(conn, table)).await {
            Ok(schema) => Ok(Arc::clone(schema)),
            Err(err) => {
                self.discard(table, &slot);
                Err(err)
            }
        }
    }

    /// Returns the cached schema of `table` without querying.
    #[must_use]
    pub fn get(&self, table: &str) -> Option<Arc<TableSchema>> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(table)
            .and_then(|slot| slot.get().cloned())
    }

    /// Returns the cached primary key of `table`.
    ///
    /// Never queries: a table that has not been resolved yet reports `None`,
    /// same as a table without a primary key.
    #[must_use]
    pub fn primary_key(&self, table: &str) -> Option<String> {
        self.get(table)
            .and_then(|schema| schema.primary_key().map(String::from))
    }

    /// Returns the number of cached schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    /// Returns whether no schema is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, table: &str) -> Slot {
        if let Some(slot) = self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(table)
        {
            return Arc::clone(slot);
        }

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(tables.entry(table.to_string()).or_default())
    }

    /// Removes `slot` if it is still the empty slot registered for `table`.
    fn discard(&self, table: &str, slot: &Slot) {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        if tables
            .get(table)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && !current.initialized())
        {
            tables.remove(table);
        }
    }
}

async fn fetch_schema<C: Connection>(conn: &C, table: &str) -> Result<Arc<TableSchema>> {
    let columns = conn.describe_table(table).await.map_err(|err| match err {
        GatewayError::Execution(source) => GatewayError::SchemaFetch {
            table: table.to_string(),
            source: Some(source),
        },
        other => other,
    })?;

    if columns.is_empty() {
        warn!(table = %table, "Introspection returned no columns");
        return Err(GatewayError::SchemaFetch {
            table: table.to_string(),
            source: None,
        });
    }

    let schema = TableSchema::from_columns(table, columns);
    info!(
        table = %table,
        columns = schema.len(),
        primary_key = ?schema.primary_key(),
        "Cached table schema"
    );
    Ok(Arc::new(schema))
}
