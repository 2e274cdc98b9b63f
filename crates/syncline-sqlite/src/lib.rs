//! Live-database schema synchronization for SQLite.
//!
//! Keeps a SQLite database's tables consistent with declared
//! [`TableMapping`]s without hand-written migration SQL. Each
//! [`Synchronizer::synchronize`] call inspects one table's actual
//! column layout, diffs it against the mapping, and executes the
//! minimal safe DDL — create, add/drop columns in place, or a full
//! create-copy-drop-rename rebuild when SQLite's limited
//! `ALTER TABLE` cannot express the change — reporting one
//! [`SyncOutcome`] per table.
//!
//! The pure comparison and planning machinery lives in
//! [`syncline_schema`]; this crate adds the live halves: schema
//! inspection, capability detection, and DDL execution.
//!
//! # Example
//!
//! ```rust,no_run
//! use syncline_sqlite::prelude::*;
//!
//! # async fn demo() -> syncline_sqlite::Result<()> {
//! let users = TableMapping::new("users")
//!     .column(bigint("id").primary_key().autoincrement())
//!     .column(text("name").not_null())
//!     .column(integer("age").default(DefaultValue::Integer(0)));
//!
//! let mut sync = Synchronizer::connect("sqlite:app.db").await?;
//! let outcome = sync.synchronize(&users, false).await?;
//! println!("users: {outcome}");
//! # Ok(())
//! # }
//! ```

pub mod capabilities;
pub mod error;
pub mod inspect;
mod sync;

pub use error::{Result, SyncError};
pub use sync::Synchronizer;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::capabilities::detect_capabilities;
    pub use crate::error::{Result, SyncError};
    pub use crate::sync::Synchronizer;
    pub use syncline_schema::{
        bigint, blob, boolean, datetime, double, integer, real, text, timestamp, varchar,
        BackendCapabilities, ColumnDef, ColumnInfo, DefaultValue, GeneratedKind, SyncAction,
        SyncOutcome, SyncPlan, TableMapping,
    };
}
