//! Table metadata discovered through schema introspection.
//!
//! Drivers report one [`ColumnInfo`] per column; [`TableSchema`] keeps the
//! parts the field matcher needs: column order, nullability, and the
//! primary key name.

/// The key role a column plays, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyRole {
    /// Part of the primary key.
    Primary,
    /// Covered by a unique index.
    Unique,
    /// First column of a non-unique index.
    Multiple,
    /// Not a key column.
    #[default]
    None,
}

impl KeyRole {
    /// Parses the `Key` column of a MySQL `SHOW COLUMNS` result
    /// (`PRI`, `UNI`, `MUL` or empty).
    #[must_use]
    pub fn from_mysql(key: &str) -> Self {
        let key = key.trim();
        if key.eq_ignore_ascii_case("PRI") {
            Self::Primary
        } else if key.eq_ignore_ascii_case("UNI") {
            Self::Unique
        } else if key.eq_ignore_ascii_case("MUL") {
            Self::Multiple
        } else {
            Self::None
        }
    }

    /// Returns whether this is [`KeyRole::Primary`].
    #[must_use]
    pub const fn is_primary(self) -> bool {
        matches!(self, Self::Primary)
    }
}

/// One column as reported by schema introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name.
    pub field: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Key role of the column.
    pub key: KeyRole,
}

impl ColumnInfo {
    /// Creates a column description.
    #[must_use]
    pub fn new(field: impl Into<String>, nullable: bool, key: KeyRole) -> Self {
        Self {
            field: field.into(),
            nullable,
            key,
        }
    }

    /// Builds a column from the `Field`, `Null` and `Key` values of a
    /// `SHOW COLUMNS` row. `Null` is `YES` for nullable columns.
    #[must_use]
    pub fn from_show_columns(field: impl Into<String>, null: &str, key: &str) -> Self {
        Self::new(
            field,
            null.trim().eq_ignore_ascii_case("YES"),
            KeyRole::from_mysql(key),
        )
    }
}

/// A column the field matcher can write to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name, unique within the table.
    pub name: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
}

/// The cached shape of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    table: String,
    columns: Vec<ColumnDescriptor>,
    primary_key: Option<String>,
}

impl TableSchema {
    /// Builds a schema from introspected columns, in the order reported.
    ///
    /// The primary key is the first column whose role is primary. Composite
    /// keys are not supported: only that first column is kept. A column
    /// name reported twice keeps its first occurrence.
    #[must_use]
    pub fn from_columns(
        table: impl Into<String>,
        infos: impl IntoIterator<Item = ColumnInfo>,
    ) -> Self {
        let mut columns: Vec<ColumnDescriptor> = Vec::new();
        let mut primary_key = None;

        for info in infos {
            if columns.iter().any(|c| c.name == info.field) {
                continue;
            }
            if primary_key.is_none() && info.key.is_primary() {
                primary_key = Some(info.field.clone());
            }
            columns.push(ColumnDescriptor {
                name: info.field,
                nullable: info.nullable,
            });
        }

        Self {
            table: table.into(),
            columns,
            primary_key,
        }
    }

    /// Returns the table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the columns in schema order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Returns the primary key column name, if the table has one.
    #[must_use]
    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns whether the table has a column named `name`.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns whether no columns were discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
