//! Error types for the synchronization engine.

use syncline_schema::MappingError;

/// Errors that can occur while synchronizing a table.
///
/// The engine performs no local recovery: every failure is surfaced
/// verbatim, and a failed call reports no [`SyncOutcome`]
/// (outcome and error are mutually exclusive).
///
/// [`SyncOutcome`]: syncline_schema::SyncOutcome
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The declared mapping violates an invariant (no columns,
    /// duplicate names). Rejected before any database call.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// The backend rejected a schema introspection query. No DDL is
    /// attempted after this: a partially introspected schema must
    /// never be acted upon.
    #[error("failed to introspect table '{table}': {source}")]
    Introspection {
        /// The table being inspected.
        table: String,
        /// The backend's error.
        #[source]
        source: sqlx::Error,
    },

    /// The backend rejected a DDL/DML statement. Earlier sub-steps of
    /// a rebuild are not rolled back.
    #[error("statement failed: `{statement}`: {source}")]
    Ddl {
        /// The offending statement.
        statement: String,
        /// The backend's error.
        #[source]
        source: sqlx::Error,
    },

    /// `sqlite_version()` returned something unparseable.
    #[error("unrecognized sqlite version string '{0}'")]
    Version(String),

    /// Connection-level database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for synchronization operations.
pub type Result<T> = std::result::Result<T, SyncError>;
