//! Statement building and parameter binding.
//!
//! Statements are written with named `:column` placeholders. Parameters are
//! bound by name with a storage kind derived from the value; drivers that
//! bind positionally call [`BoundStatement::to_positional`].

use thiserror::Error;

use crate::matcher::{FieldPlan, MatchedRecord};
use crate::value::SqlValue;

/// The engine-level kind a parameter is bound with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Boolean parameter.
    Bool,
    /// Integer parameter.
    Int,
    /// NULL parameter.
    Null,
    /// String parameter.
    Str,
}

/// A parameter value, already reduced to its storage kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundParam {
    /// Bound as NULL.
    Null,
    /// Bound as a boolean.
    Bool(bool),
    /// Bound as an integer.
    Int(i64),
    /// Bound as a string.
    Str(String),
    /// Bound as a string of raw bytes, passed through unchanged.
    Bytes(Vec<u8>),
}

impl BoundParam {
    /// Returns the storage kind.
    #[must_use]
    pub const fn kind(&self) -> ParamKind {
        match self {
            Self::Null => ParamKind::Null,
            Self::Bool(_) => ParamKind::Bool,
            Self::Int(_) => ParamKind::Int,
            Self::Str(_) | Self::Bytes(_) => ParamKind::Str,
        }
    }
}

impl From<SqlValue> for BoundParam {
    /// Floats and blobs have no kind of their own and bind as strings;
    /// blob bytes are kept as they are.
    fn from(value: SqlValue) -> Self {
        match value {
            SqlValue::Null => Self::Null,
            SqlValue::Bool(b) => Self::Bool(b),
            SqlValue::Int(n) => Self::Int(n),
            SqlValue::Float(x) => Self::Str(x.to_string()),
            SqlValue::Text(s) => Self::Str(s),
            SqlValue::Blob(b) => Self::Bytes(b),
        }
    }
}

impl From<&SqlValue> for BoundParam {
    fn from(value: &SqlValue) -> Self {
        Self::from(value.clone())
    }
}

/// Errors raised when a statement's placeholders and bound parameters
/// disagree. They surface when the statement is executed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatementError {
    /// A placeholder in the SQL has no bound value.
    #[error("no value bound for parameter :{0}")]
    UnboundParameter(String),

    /// A value was bound under a name the SQL never uses.
    #[error("parameter :{0} is not defined in the statement")]
    UndefinedParameter(String),
}

/// SQL text with named parameters attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundStatement {
    sql: String,
    params: Vec<(String, BoundParam)>,
}

impl BoundStatement {
    /// Creates a statement with no parameters bound.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Returns the SQL text with its named placeholders.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the bound parameters in binding order.
    #[must_use]
    pub fn params(&self) -> &[(String, BoundParam)] {
        &self.params
    }

    /// Returns the parameter bound under `name` (with or without the
    /// leading `:`).
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&BoundParam> {
        let name = name.strip_prefix(':').unwrap_or(name);
        self.params
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, param)| param)
    }

    /// Binds `value` under `name`, classified by its kind.
    ///
    /// Binding a name twice replaces the earlier value. The name is not
    /// checked against the SQL here; see [`Self::to_positional`].
    pub fn bind(&mut self, name: &str, value: &SqlValue) {
        let name = name.strip_prefix(':').unwrap_or(name);
        let param = BoundParam::from(value);
        match self.params.iter_mut().find(|(bound, _)| bound == name) {
            Some((_, existing)) => *existing = param,
            None => self.params.push((name.to_string(), param)),
        }
    }

    /// Rewrites named placeholders into `?` markers and returns the
    /// parameters in placeholder order. A name used twice is passed twice.
    ///
    /// Placeholders inside quoted strings or identifiers are left alone, as
    /// are `::` casts.
    ///
    /// # Errors
    ///
    /// Returns [`StatementError::UnboundParameter`] for a placeholder with
    /// no value and [`StatementError::UndefinedParameter`] for a bound
    /// value no placeholder refers to.
    pub fn to_positional(&self) -> Result<(String, Vec<&BoundParam>), StatementError> {
        let (sql, names) = scan_placeholders(&self.sql);

        let params = names
            .iter()
            .map(|name| {
                self.param(name)
                    .ok_or_else(|| StatementError::UnboundParameter((*name).to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Some((unused, _)) = self
            .params
            .iter()
            .find(|(bound, _)| !names.contains(&bound.as_str()))
        {
            return Err(StatementError::UndefinedParameter(unused.clone()));
        }

        Ok((sql, params))
    }
}

/// Binds every matched column under its own name.
pub fn bind_all(statement: &mut BoundStatement, matched: &MatchedRecord) {
    for (column, value) in matched.iter() {
        statement.bind(column, value);
    }
}

/// Builds `insert into <table> (<fields>) values (<placeholders>)`.
#[must_use]
pub fn insert_sql(table: &str, plan: &FieldPlan) -> String {
    format!(
        "insert into {table} ({}) values ({})",
        plan.fields_sql(),
        plan.placeholders_sql()
    )
}

/// Builds `update <table> set <assignments> where <pk> = :<pk>`.
#[must_use]
pub fn update_sql(table: &str, plan: &FieldPlan, primary_key: &str) -> String {
    format!(
        "update {table} set {} where {primary_key} = :{primary_key}",
        plan.assignments_sql()
    )
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns the SQL with `:name` placeholders replaced by `?`, plus the
/// names in order of appearance.
fn scan_placeholders(sql: &str) -> (String, Vec<&str>) {
    let mut rewritten = String::with_capacity(sql.len());
    let mut names = Vec::new();
    let mut chars = sql.char_indices().peekable();
    let mut quote: Option<char> = None;

    while let Some((pos, c)) = chars.next() {
        if let Some(open) = quote {
            rewritten.push(c);
            if c == open {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                rewritten.push(c);
            }
            ':' => match chars.peek() {
                Some(&(_, ':')) => {
                    chars.next();
                    rewritten.push_str("::");
                }
                Some(&(_, next)) if is_name_char(next) => {
                    let start = pos + 1;
                    let mut end = start;
                    while let Some(&(i, n)) = chars.peek() {
                        if !is_name_char(n) {
                            break;
                        }
                        end = i + n.len_utf8();
                        chars.next();
                    }
                    names.push(&sql[start..end]);
                    rewritten.push('?');
                }
                _ => rewritten.push(':'),
            },
            _ => rewritten.push(c),
        }
    }

    (rewritten, names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::match_fields;
    use crate::record;
    use crate::schema::{ColumnInfo, KeyRole, TableSchema};

    fn people() -> TableSchema {
        TableSchema::from_columns(
            "people",
            vec![
                ColumnInfo::new("id", false, KeyRole::Primary),
                ColumnInfo::new("first_name", true, KeyRole::None),
                ColumnInfo::new("last_name", true, KeyRole::None),
            ],
        )
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            BoundParam::from(SqlValue::Bool(true)).kind(),
            ParamKind::Bool
        );
        assert_eq!(BoundParam::from(SqlValue::Int(3)).kind(), ParamKind::Int);
        assert_eq!(BoundParam::from(SqlValue::Null).kind(), ParamKind::Null);
        assert_eq!(
            BoundParam::from(SqlValue::Text(String::from("x"))).kind(),
            ParamKind::Str
        );
        assert_eq!(
            BoundParam::from(SqlValue::Float(1.5)),
            BoundParam::Str(String::from("1.5"))
        );
        let blob = BoundParam::from(SqlValue::Blob(vec![0xff, 0x00, 0xfe, 0x41]));
        assert_eq!(blob, BoundParam::Bytes(vec![0xff, 0x00, 0xfe, 0x41]));
        assert_eq!(blob.kind(), ParamKind::Str);
    }

    #[test]
    fn test_insert_statement_for_people() {
        let record = record! { "first_name" => "Chad", "last_name" => "Burke" };
        let (matched, plan) = match_fields(&record, &people());

        let mut statement = BoundStatement::new(insert_sql("people", &plan));
        bind_all(&mut statement, &matched);

        assert_eq!(
            statement.sql(),
            "insert into people (first_name, last_name) values (:first_name, :last_name)"
        );
        assert_eq!(
            statement.param("first_name"),
            Some(&BoundParam::Str(String::from("Chad")))
        );
        assert_eq!(
            statement.param(":last_name"),
            Some(&BoundParam::Str(String::from("Burke")))
        );
    }

    #[test]
    fn test_update_statement_binds_id_and_fields() {
        let record = record! { "first_name" => "Brian" };
        let (matched, plan) = match_fields(&record, &people());

        let mut statement = BoundStatement::new(update_sql("people", &plan, "id"));
        statement.bind("id", &SqlValue::Int(2));
        bind_all(&mut statement, &matched);

        assert_eq!(
            statement.sql(),
            "update people set first_name = :first_name where id = :id"
        );
        let (sql, params) = statement.to_positional().unwrap();
        assert_eq!(sql, "update people set first_name = ? where id = ?");
        assert_eq!(
            params,
            [&BoundParam::Str(String::from("Brian")), &BoundParam::Int(2)]
        );
    }

    #[test]
    fn test_rebinding_replaces_value() {
        let mut statement = BoundStatement::new("update t set a = :a where id = :id");
        statement.bind(":a", &SqlValue::Int(1));
        statement.bind("a", &SqlValue::Int(2));
        statement.bind("id", &SqlValue::Int(9));

        assert_eq!(statement.params().len(), 2);
        assert_eq!(statement.param("a"), Some(&BoundParam::Int(2)));
    }

    #[test]
    fn test_positional_repeats_reused_names() {
        let mut statement = BoundStatement::new("select :a, :b, :a");
        statement.bind("a", &SqlValue::Int(1));
        statement.bind("b", &SqlValue::Null);

        let (sql, params) = statement.to_positional().unwrap();
        assert_eq!(sql, "select ?, ?, ?");
        assert_eq!(
            params,
            [&BoundParam::Int(1), &BoundParam::Null, &BoundParam::Int(1)]
        );
    }

    #[test]
    fn test_positional_skips_quotes_and_casts() {
        let mut statement =
            BoundStatement::new("select ':skip', \"x:y\", `a:b`, c::text from t where id = :id");
        statement.bind("id", &SqlValue::Int(1));

        let (sql, params) = statement.to_positional().unwrap();
        assert_eq!(
            sql,
            "select ':skip', \"x:y\", `a:b`, c::text from t where id = ?"
        );
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_unbound_placeholder_fails() {
        let statement = BoundStatement::new("update t set a = :a where id = :id");
        assert_eq!(
            statement.to_positional().unwrap_err(),
            StatementError::UnboundParameter(String::from("a"))
        );
    }

    #[test]
    fn test_undefined_parameter_fails() {
        let mut statement = BoundStatement::new("select * from t where id = :id");
        statement.bind("id", &SqlValue::Int(1));
        statement.bind("ghost", &SqlValue::Int(2));
        assert_eq!(
            statement.to_positional().unwrap_err(),
            StatementError::UndefinedParameter(String::from("ghost"))
        );
    }

    #[test]
    fn test_lone_colon_is_kept() {
        let statement = BoundStatement::new("select 'a' || ': ' || 'b', 1 :");
        let (sql, params) = statement.to_positional().unwrap();
        assert_eq!(sql, "select 'a' || ': ' || 'b', 1 :");
        assert!(params.is_empty());
    }
}
