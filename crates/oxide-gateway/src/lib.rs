//! # oxide-gateway
//!
//! Schema-aware insert and update of loosely-typed records over `sqlx`.
//!
//! A [`RecordGateway`] takes a table name and a [`Record`] (column name to
//! [`SqlValue`]), looks up the table's columns once per table, drops record
//! keys that are not columns, and executes a parameterized
//! `insert into ... values (...)` or `update ... set ... where pk = ...`.
//! Raw reads ([`RecordGateway::fetch_all`], [`RecordGateway::fetch_one`],
//! [`RecordGateway::fetch_scalar`]) pass SQL through unchanged.
//!
//! ## Drivers
//!
//! - [`SqliteDriver`], always available
//! - `MySqlDriver`, behind the `mysql` feature
//!
//! Any other backend can implement [`Connection`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use oxide_gateway::{record, GatewayConfig, RecordGateway, SqliteDriver};
//!
//! let driver = SqliteDriver::connect(&GatewayConfig::new("sqlite:people.db")).await?;
//! let gateway = RecordGateway::new(driver);
//!
//! let id = gateway
//!     .insert(
//!         "people",
//!         &record! {
//!             "first_name" => "Sean",
//!             "last_name" => "Burke",
//!             "field_that_doesnt_exist" => "Test",
//!         },
//!     )
//!     .await?;
//! ```

mod cache;
pub mod config;
mod connection;
mod error;
mod gateway;
#[cfg(feature = "mysql")]
pub mod mysql;
pub mod sqlite;
#[cfg(test)]
mod testing;

pub use cache::SchemaCache;
pub use config::GatewayConfig;
pub use connection::{Connection, ExecOutcome};
pub use error::{GatewayError, Result};
pub use gateway::RecordGateway;
#[cfg(feature = "mysql")]
pub use mysql::MySqlDriver;
pub use sqlite::SqliteDriver;

pub use oxide_gateway_core::{
    record, record_from_json, BoundParam, BoundStatement, ColumnInfo, KeyRole, ParamKind, Record,
    Row, SqlValue, StatementError, TableSchema, ToSqlValue,
};
