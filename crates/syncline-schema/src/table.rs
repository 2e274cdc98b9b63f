//! Declared table schemas.
//!
//! A [`TableMapping`] is the engine's view of one entity mapping: the
//! table name plus an ordered list of [`ColumnDef`]s. The caller's
//! mapping layer (reflection, derive macro, hand-written code) builds
//! these; the synchronization engine only consumes them.

use std::fmt;

use crate::column::ColumnDef;
use crate::info::ColumnInfo;

/// Validation failure for a [`TableMapping`].
///
/// Raised before any database call is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// The mapping declares no columns at all.
    Empty {
        /// Table name.
        table: String,
    },
    /// Two declared columns share a name.
    DuplicateColumn {
        /// Table name.
        table: String,
        /// The duplicated column name.
        column: String,
    },
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { table } => {
                write!(f, "table mapping '{table}' declares no columns")
            }
            Self::DuplicateColumn { table, column } => {
                write!(f, "table mapping '{table}' declares column '{column}' twice")
            }
        }
    }
}

impl std::error::Error for MappingError {}

/// The declared schema of one table: the desired state.
#[derive(Debug, Clone, PartialEq)]
pub struct TableMapping {
    name: String,
    columns: Vec<ColumnDef>,
}

impl TableMapping {
    /// Creates an empty mapping for the given table name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Appends a column to the mapping.
    #[must_use]
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Looks up a declared column by name.
    #[must_use]
    pub fn find_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Checks the mapping's invariants: at least one column, unique
    /// column names.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError`] on the first violated invariant.
    pub fn validate(&self) -> Result<(), MappingError> {
        if self.columns.is_empty() {
            return Err(MappingError::Empty {
                table: self.name.clone(),
            });
        }
        for (i, col) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name == col.name) {
                return Err(MappingError::DuplicateColumn {
                    table: self.name.clone(),
                    column: col.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Lowers the declared columns into descriptors for comparison
    /// against the live schema.
    ///
    /// Primary-key positions are assigned in declaration order,
    /// matching how SQLite numbers them in `PRAGMA table_xinfo`.
    #[must_use]
    pub fn column_info(&self) -> Vec<ColumnInfo> {
        let mut pk_position = 0;
        self.columns
            .iter()
            .enumerate()
            .map(|(ordinal, col)| {
                let pk = if col.primary_key {
                    pk_position += 1;
                    pk_position
                } else {
                    0
                };
                ColumnInfo {
                    ordinal: ordinal as i64,
                    name: col.name.clone(),
                    declared_type: col.sql_type.sqlite_name().to_string(),
                    not_null: col.not_null,
                    default_value: col.default.as_ref().map(crate::DefaultValue::to_sql),
                    pk_position: pk,
                    generated: col.generated.as_ref().map(|g| g.kind),
                }
            })
            .collect()
    }
}
