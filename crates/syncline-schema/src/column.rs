//! Column definitions for declared table schemas.
//!
//! A [`ColumnDef`] describes one column the way the entity mapping
//! declares it: SQL type, constraints, default value, and (optionally)
//! a generated-column expression. Free builder functions (`integer`,
//! `text`, ...) provide a fluent API for assembling them.

/// SQL data types supported by the schema layer.
///
/// SQLite resolves all of these to one of its five type affinities;
/// the declared name is kept for DDL generation only and is never
/// used when comparing schemas.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SqlType {
    /// Integer (32-bit).
    Integer,
    /// Big integer (64-bit).
    BigInt,
    /// Small integer (16-bit).
    SmallInt,
    /// Text/string of unbounded length.
    Text,
    /// Variable-length character string.
    Varchar(usize),
    /// Boolean, stored as 0/1.
    Boolean,
    /// Date and time.
    DateTime,
    /// Date only.
    Date,
    /// Timestamp (alias for DateTime).
    Timestamp,
    /// Floating point (single precision).
    Real,
    /// Floating point (double precision).
    Double,
    /// Arbitrary-precision numeric.
    Numeric,
    /// Binary large object.
    Blob,
    /// JSON document, stored as text.
    Json,
    /// UUID, stored as text.
    Uuid,
}

impl SqlType {
    /// Returns the SQLite type name for this type.
    #[must_use]
    pub fn sqlite_name(&self) -> &'static str {
        match self {
            Self::Integer | Self::SmallInt | Self::BigInt | Self::Boolean => "INTEGER",
            Self::Text | Self::Varchar(_) => "TEXT",
            Self::DateTime | Self::Date | Self::Timestamp | Self::Json | Self::Uuid => "TEXT",
            Self::Real | Self::Double => "REAL",
            Self::Numeric => "NUMERIC",
            Self::Blob => "BLOB",
        }
    }
}

/// Default value for a column.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// NULL default.
    Null,
    /// Boolean default, rendered as 0/1.
    Boolean(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default.
    String(String),
    /// Raw SQL expression (e.g. `CURRENT_TIMESTAMP`).
    Expression(String),
}

impl DefaultValue {
    /// Returns the SQL representation of this default value.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Boolean(b) => String::from(if *b { "1" } else { "0" }),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Expression(expr) => expr.clone(),
        }
    }
}

/// How a generated column's value is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratedKind {
    /// Computed on read; never written to disk.
    Virtual,
    /// Computed on write and stored like an ordinary column.
    Stored,
}

impl GeneratedKind {
    /// Returns the SQL keyword for this storage kind.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Virtual => "VIRTUAL",
            Self::Stored => "STORED",
        }
    }
}

/// A generated-column clause: the expression and its storage kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedColumn {
    /// Storage kind (VIRTUAL or STORED).
    pub kind: GeneratedKind,
    /// The generating SQL expression, without the surrounding parens.
    pub expression: String,
}

/// A single declared column: everything DDL generation needs.
///
/// Only a subset of these fields takes part in schema comparison (see
/// [`ColumnInfo`](crate::ColumnInfo)); `unique` and `autoincrement` in
/// particular are DDL-only because SQLite's introspection does not
/// report them.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Declared SQL type.
    pub sql_type: SqlType,
    /// Whether the column is declared NOT NULL.
    pub not_null: bool,
    /// Default value, if any.
    pub default: Option<DefaultValue>,
    /// Whether this column is part of the primary key.
    pub primary_key: bool,
    /// Whether this column auto-increments.
    pub autoincrement: bool,
    /// Whether this column carries a UNIQUE constraint.
    pub unique: bool,
    /// Generated-column clause, if any.
    pub generated: Option<GeneratedColumn>,
}

impl ColumnDef {
    /// Creates a new nullable column with no constraints.
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            not_null: false,
            default: None,
            primary_key: false,
            autoincrement: false,
            unique: false,
            generated: None,
        }
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets a raw SQL expression as the default value.
    #[must_use]
    pub fn default_expr(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(DefaultValue::Expression(expr.into()));
        self
    }

    /// Marks the column as (part of) the primary key.
    ///
    /// Primary key columns are implicitly NOT NULL.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    /// Marks the column AUTOINCREMENT.
    #[must_use]
    pub fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self
    }

    /// Marks the column UNIQUE.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Declares the column as GENERATED ALWAYS ... VIRTUAL.
    #[must_use]
    pub fn generated_virtual(mut self, expression: impl Into<String>) -> Self {
        self.generated = Some(GeneratedColumn {
            kind: GeneratedKind::Virtual,
            expression: expression.into(),
        });
        self
    }

    /// Declares the column as GENERATED ALWAYS ... STORED.
    #[must_use]
    pub fn generated_stored(mut self, expression: impl Into<String>) -> Self {
        self.generated = Some(GeneratedColumn {
            kind: GeneratedKind::Stored,
            expression: expression.into(),
        });
        self
    }
}

/// Builds an INTEGER column.
#[must_use]
pub fn integer(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, SqlType::Integer)
}

/// Builds a BIGINT column.
#[must_use]
pub fn bigint(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, SqlType::BigInt)
}

/// Builds a TEXT column.
#[must_use]
pub fn text(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, SqlType::Text)
}

/// Builds a VARCHAR column with a length hint.
#[must_use]
pub fn varchar(name: impl Into<String>, len: usize) -> ColumnDef {
    ColumnDef::new(name, SqlType::Varchar(len))
}

/// Builds a BOOLEAN column.
#[must_use]
pub fn boolean(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, SqlType::Boolean)
}

/// Builds a REAL column.
#[must_use]
pub fn real(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, SqlType::Real)
}

/// Builds a DOUBLE column.
#[must_use]
pub fn double(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, SqlType::Double)
}

/// Builds a BLOB column.
#[must_use]
pub fn blob(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, SqlType::Blob)
}

/// Builds a DATETIME column.
#[must_use]
pub fn datetime(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, SqlType::DateTime)
}

/// Builds a TIMESTAMP column.
#[must_use]
pub fn timestamp(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, SqlType::Timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_constraints() {
        let col = bigint("id").primary_key().autoincrement();
        assert_eq!(col.name, "id");
        assert!(col.primary_key);
        assert!(col.autoincrement);
        assert!(col.not_null, "primary keys are implicitly NOT NULL");
    }

    #[test]
    fn default_value_rendering() {
        assert_eq!(DefaultValue::Null.to_sql(), "NULL");
        assert_eq!(DefaultValue::Boolean(true).to_sql(), "1");
        assert_eq!(DefaultValue::Integer(42).to_sql(), "42");
        assert_eq!(DefaultValue::String("it's".into()).to_sql(), "'it''s'");
        assert_eq!(
            DefaultValue::Expression("CURRENT_TIMESTAMP".into()).to_sql(),
            "CURRENT_TIMESTAMP"
        );
    }

    #[test]
    fn sqlite_type_names() {
        assert_eq!(SqlType::BigInt.sqlite_name(), "INTEGER");
        assert_eq!(SqlType::Varchar(255).sqlite_name(), "TEXT");
        assert_eq!(SqlType::Boolean.sqlite_name(), "INTEGER");
        assert_eq!(SqlType::Timestamp.sqlite_name(), "TEXT");
        assert_eq!(SqlType::Blob.sqlite_name(), "BLOB");
    }

    #[test]
    fn generated_builders() {
        let col = integer("total").generated_virtual("price * qty");
        let gen = col.generated.unwrap();
        assert_eq!(gen.kind, GeneratedKind::Virtual);
        assert_eq!(gen.expression, "price * qty");

        let col = integer("total").generated_stored("price * qty");
        assert_eq!(col.generated.unwrap().kind, GeneratedKind::Stored);
    }
}
