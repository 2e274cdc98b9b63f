//! Schema descriptors, diffing, and sync planning for SQLite.
//!
//! This crate is the pure half of the synchronization engine: it
//! defines what a declared table looks like ([`TableMapping`]), what
//! the database reports ([`ColumnInfo`]), how the two are compared
//! ([`diff_columns`]), and which of the six [`SyncOutcome`]s a given
//! delta maps to ([`plan_sync`]). It performs no IO; the companion
//! `syncline-sqlite` crate inspects the live database and executes the
//! plans produced here.
//!
//! # Example
//!
//! ```rust
//! use syncline_schema::{
//!     bigint, text, diff_columns, plan_sync,
//!     BackendCapabilities, SyncOutcome, TableMapping,
//! };
//!
//! let users = TableMapping::new("users")
//!     .column(bigint("id").primary_key().autoincrement())
//!     .column(text("name").not_null());
//!
//! // The table does not exist yet: the planner decides to create it.
//! let delta = diff_columns(&users.column_info(), &[]);
//! let plan = plan_sync(false, &delta, false, &BackendCapabilities::default());
//! assert_eq!(plan.outcome, SyncOutcome::NewTableCreated);
//! ```

mod column;
pub mod ddl;
pub mod diff;
mod info;
pub mod plan;
mod table;

pub use column::{
    bigint, blob, boolean, datetime, double, integer, real, text, timestamp, varchar, ColumnDef,
    DefaultValue, GeneratedColumn, GeneratedKind, SqlType,
};
pub use ddl::SqliteDdl;
pub use diff::{diff_columns, SchemaDelta};
pub use info::ColumnInfo;
pub use plan::{plan_sync, BackendCapabilities, SyncAction, SyncOutcome, SyncPlan};
pub use table::{MappingError, TableMapping};
