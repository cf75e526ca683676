//! Field matching: restricting a record to a table's columns.
//!
//! Matching walks the schema, not the record, so every output follows
//! schema column order regardless of how the record was built.

use crate::schema::TableSchema;
use crate::value::{Record, SqlValue};

/// The part of a record that maps onto existing columns, in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchedRecord {
    entries: Vec<(String, SqlValue)>,
}

impl MatchedRecord {
    /// Returns the value matched for `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Iterates over `(column, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the matched column names in schema order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Returns the number of matched columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no column matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// SQL fragments for the matched columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPlan {
    /// `column = :column` assignments for UPDATE.
    pub updates: Vec<String>,
    /// Column names for INSERT.
    pub insert_fields: Vec<String>,
    /// `:column` placeholders for INSERT, parallel to `insert_fields`.
    pub insert_values: Vec<String>,
}

impl FieldPlan {
    fn push(&mut self, column: &str) {
        self.updates.push(format!("{column} = :{column}"));
        self.insert_fields.push(column.to_string());
        self.insert_values.push(format!(":{column}"));
    }

    /// Returns the comma-separated SET assignments.
    #[must_use]
    pub fn assignments_sql(&self) -> String {
        self.updates.join(", ")
    }

    /// Returns the comma-separated INSERT column list.
    #[must_use]
    pub fn fields_sql(&self) -> String {
        self.insert_fields.join(", ")
    }

    /// Returns the comma-separated INSERT placeholder list.
    #[must_use]
    pub fn placeholders_sql(&self) -> String {
        self.insert_values.join(", ")
    }

    /// Returns whether no column is planned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.insert_fields.is_empty()
    }
}

/// Matches `record` against `schema`.
///
/// For each column in schema order:
/// - a column missing from the record is skipped, so it never reaches SQL;
/// - a non-empty value is copied as-is;
/// - a null or empty value becomes `Null` on a nullable column and the
///   empty string otherwise.
///
/// Record keys that are not columns are dropped silently; see
/// [`unknown_fields`] to report them.
#[must_use]
pub fn match_fields(record: &Record, schema: &TableSchema) -> (MatchedRecord, FieldPlan) {
    let mut matched = MatchedRecord::default();
    let mut plan = FieldPlan::default();

    for column in schema.columns() {
        let Some(value) = record.get(&column.name) else {
            continue;
        };
        let value = if value.is_empty() {
            empty_value(column.nullable)
        } else {
            value.clone()
        };
        matched.entries.push((column.name.clone(), value));
        plan.push(&column.name);
    }

    (matched, plan)
}

const fn empty_value(nullable: bool) -> SqlValue {
    if nullable {
        SqlValue::Null
    } else {
        SqlValue::Text(String::new())
    }
}

/// Returns the record keys that match no column of `schema`.
#[must_use]
pub fn unknown_fields<'a>(record: &'a Record, schema: &TableSchema) -> Vec<&'a str> {
    record
        .keys()
        .map(String::as_str)
        .filter(|field| !schema.has_column(field))
        .collect()
}
