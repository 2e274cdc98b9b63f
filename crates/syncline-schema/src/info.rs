//! Column descriptors: the unit of schema comparison.
//!
//! A [`ColumnInfo`] describes one column the way SQLite's
//! `PRAGMA table_xinfo` reports it. Both sides of a diff use this
//! shape: the declared side is lowered from a
//! [`TableMapping`](crate::TableMapping), the actual side is read from
//! the live database.

use crate::column::GeneratedKind;

/// One column's descriptor, as declared by a mapping or reported by
/// the database.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    /// Zero-based position within the table.
    pub ordinal: i64,
    /// Column name.
    pub name: String,
    /// Declared SQL type text. Informational only; SQLite normalizes
    /// type names, so this never takes part in comparison.
    pub declared_type: String,
    /// Whether the column is NOT NULL.
    pub not_null: bool,
    /// Default value literal, if any. Only presence is compared, not
    /// content — the engine may rewrite the literal text.
    pub default_value: Option<String>,
    /// One-based position within the primary key; 0 for non-key
    /// columns.
    pub pk_position: i64,
    /// Generated-column storage kind, if the column is generated.
    pub generated: Option<GeneratedKind>,
}

impl ColumnInfo {
    /// Structural equality: true when two descriptors describe a
    /// column the engine would treat as unchanged.
    ///
    /// Compares name, NOT NULL, presence of a default value, and
    /// primary-key position. Declared type text and the default
    /// literal's content are excluded.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.name == other.name
            && self.not_null == other.not_null
            && self.default_value.is_some() == other.default_value.is_some()
            && self.pk_position == other.pk_position
    }
}
