//! # oxide-gateway-core
//!
//! Driver-agnostic pieces of the record gateway.
//!
//! This crate provides:
//! - [`SqlValue`] and [`Record`], the loosely-typed input of inserts and
//!   updates, and [`Row`], the output of raw reads
//! - [`TableSchema`], the introspected shape of a table
//! - [`match_fields`], which restricts a record to a table's columns and
//!   applies the null/empty policy
//! - [`BoundStatement`] with kind-classified named parameters
//!
//! ## Matching a record
//!
//! ```rust
//! use oxide_gateway_core::{
//!     bind_all, insert_sql, match_fields, record, BoundParam, BoundStatement, ColumnInfo,
//!     KeyRole, TableSchema,
//! };
//!
//! let schema = TableSchema::from_columns(
//!     "people",
//!     vec![
//!         ColumnInfo::new("id", false, KeyRole::Primary),
//!         ColumnInfo::new("first_name", true, KeyRole::None),
//!         ColumnInfo::new("last_name", true, KeyRole::None),
//!     ],
//! );
//!
//! let record = record! {
//!     "first_name" => "Chad",
//!     "last_name" => "Burke",
//!     "field_that_doesnt_exist" => "Test",
//! };
//!
//! let (matched, plan) = match_fields(&record, &schema);
//! let mut statement = BoundStatement::new(insert_sql("people", &plan));
//! bind_all(&mut statement, &matched);
//!
//! assert_eq!(
//!     statement.sql(),
//!     "insert into people (first_name, last_name) values (:first_name, :last_name)"
//! );
//! assert_eq!(
//!     statement.param("first_name"),
//!     Some(&BoundParam::Str(String::from("Chad")))
//! );
//! ```

pub mod matcher;
pub mod schema;
pub mod statement;
pub mod value;

pub use matcher::{match_fields, unknown_fields, FieldPlan, MatchedRecord};
pub use schema::{ColumnDescriptor, ColumnInfo, KeyRole, TableSchema};
pub use statement::{
    bind_all, insert_sql, update_sql, BoundParam, BoundStatement, ParamKind, StatementError,
};
pub use value::{record_from_json, Record, Row, SqlValue, ToSqlValue};
