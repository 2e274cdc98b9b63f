//! The synchronization engine's public surface and DDL executor.
//!
//! One [`Synchronizer`] owns a single [`SqliteConnection`] and the
//! backend's capability flags. Each `synchronize` call runs the full
//! pipeline for one table — inspect, diff, plan, execute — and
//! reports one [`SyncOutcome`].

use std::collections::BTreeMap;

use sqlx::sqlite::SqliteConnection;
use sqlx::Connection;
use tracing::{debug, info};

use syncline_schema::{
    diff_columns, plan_sync, BackendCapabilities, ColumnInfo, SqliteDdl, SyncAction, SyncOutcome,
    SyncPlan, TableMapping,
};

use crate::capabilities::detect_capabilities;
use crate::error::{Result, SyncError};
use crate::inspect;

/// Synchronizes declared table mappings against a live SQLite
/// database.
///
/// The connection is owned exclusively: no other statement can
/// interleave with a running synchronization, which matters because a
/// half-applied rebuild (original dropped, rename pending) must never
/// be observed by a concurrent reader.
pub struct Synchronizer {
    conn: SqliteConnection,
    capabilities: BackendCapabilities,
    ddl: SqliteDdl,
}

impl Synchronizer {
    /// Connects to the given database URL and detects the backend's
    /// capabilities once.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or the version probe fails.
    pub async fn connect(url: &str) -> Result<Self> {
        let mut conn = SqliteConnection::connect(url).await?;
        let capabilities = detect_capabilities(&mut conn).await?;
        Ok(Self::new(conn, capabilities))
    }

    /// Wraps an existing connection with explicit capability flags.
    #[must_use]
    pub fn new(conn: SqliteConnection, capabilities: BackendCapabilities) -> Self {
        Self {
            conn,
            capabilities,
            ddl: SqliteDdl::new(),
        }
    }

    /// Returns the detected capability flags.
    #[must_use]
    pub fn capabilities(&self) -> &BackendCapabilities {
        &self.capabilities
    }

    /// Borrows the underlying connection, e.g. for ordinary data
    /// access between synchronization calls.
    pub fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }

    /// Releases the underlying connection.
    #[must_use]
    pub fn into_inner(self) -> SqliteConnection {
        self.conn
    }

    /// Returns whether the named table exists.
    ///
    /// # Errors
    ///
    /// Surfaces introspection failures as
    /// [`SyncError::Introspection`].
    pub async fn table_exists(&mut self, table: &str) -> Result<bool> {
        inspect::table_exists(&mut self.conn, table).await
    }

    /// Returns the named table's live column descriptors, empty if
    /// the table does not exist.
    ///
    /// # Errors
    ///
    /// Surfaces introspection failures as
    /// [`SyncError::Introspection`].
    pub async fn table_columns(&mut self, table: &str) -> Result<Vec<ColumnInfo>> {
        inspect::table_columns(&mut self.conn, table, &self.capabilities).await
    }

    /// Computes the plan for one table without executing anything.
    ///
    /// The schema is re-inspected on every call; nothing is cached, so
    /// planning and a later `synchronize` may disagree if the database
    /// changed in between.
    ///
    /// # Errors
    ///
    /// Mapping validation and introspection failures.
    pub async fn plan(
        &mut self,
        mapping: &TableMapping,
        preserve_extra_columns: bool,
    ) -> Result<SyncPlan> {
        mapping.validate()?;
        let (exists, actual) = self.inspect_table(mapping.name()).await?;
        let delta = diff_columns(&mapping.column_info(), &actual);
        Ok(plan_sync(
            exists,
            &delta,
            preserve_extra_columns,
            &self.capabilities,
        ))
    }

    /// Reconciles one table's live schema with its mapping.
    ///
    /// Inspects the table fresh, diffs, plans, and executes the
    /// resulting DDL. Safe to call any number of times: a table that
    /// already matches reports [`SyncOutcome::AlreadyInSync`] with
    /// zero statements executed.
    ///
    /// The rebuild path runs as four separate statements with no
    /// implicit transaction; callers that need atomicity must wrap
    /// the call in their own transaction. If a rebuild is interrupted
    /// after the temporary table is created, both tables remain; the
    /// next call picks an unused temporary name and proceeds, but the
    /// orphan is not cleaned up.
    ///
    /// # Errors
    ///
    /// Mapping validation, introspection, and DDL failures. No
    /// partial-state rollback is performed.
    pub async fn synchronize(
        &mut self,
        mapping: &TableMapping,
        preserve_extra_columns: bool,
    ) -> Result<SyncOutcome> {
        mapping.validate()?;
        let table = mapping.name();
        let (exists, actual) = self.inspect_table(table).await?;
        let delta = diff_columns(&mapping.column_info(), &actual);
        let plan = plan_sync(exists, &delta, preserve_extra_columns, &self.capabilities);

        match &plan.action {
            SyncAction::Nothing => {}
            SyncAction::CreateTable => {
                self.execute(self.ddl.create_table(mapping)).await?;
            }
            SyncAction::AlterInPlace { drop, add } => {
                for name in drop {
                    self.execute(self.ddl.drop_column(table, name)).await?;
                }
                for name in add {
                    let column = mapping
                        .find_column(name)
                        .expect("planned additions name declared columns");
                    self.execute(self.ddl.add_column(table, column)).await?;
                }
            }
            SyncAction::Rebuild => {
                self.rebuild_table(mapping, &actual).await?;
            }
        }

        info!(table = %table, outcome = %plan.outcome, "table synchronized");
        Ok(plan.outcome)
    }

    /// Synchronizes a collection of mappings in order, returning the
    /// outcome per table name.
    ///
    /// Stops at the first failing table; earlier tables stay
    /// synchronized.
    ///
    /// # Errors
    ///
    /// The first table's failure, as for [`Self::synchronize`].
    pub async fn synchronize_all(
        &mut self,
        mappings: &[TableMapping],
        preserve_extra_columns: bool,
    ) -> Result<BTreeMap<String, SyncOutcome>> {
        let mut outcomes = BTreeMap::new();
        for mapping in mappings {
            let outcome = self.synchronize(mapping, preserve_extra_columns).await?;
            outcomes.insert(mapping.name().to_string(), outcome);
        }
        Ok(outcomes)
    }

    async fn inspect_table(&mut self, table: &str) -> Result<(bool, Vec<ColumnInfo>)> {
        let exists = inspect::table_exists(&mut self.conn, table).await?;
        let actual = if exists {
            inspect::table_columns(&mut self.conn, table, &self.capabilities).await?
        } else {
            Vec::new()
        };
        Ok((exists, actual))
    }

    /// Create-copy-drop-rename.
    ///
    /// Copies the intersection of declared and live column names,
    /// minus declared generated columns (the engine computes their
    /// values itself).
    async fn rebuild_table(&mut self, mapping: &TableMapping, actual: &[ColumnInfo]) -> Result<()> {
        let table = mapping.name();
        let temp = self.free_temp_name(table).await?;

        self.execute(self.ddl.create_table_named(mapping, &temp))
            .await?;

        let surviving: Vec<&str> = mapping
            .columns()
            .iter()
            .filter(|c| c.generated.is_none())
            .filter(|c| actual.iter().any(|a| a.name == c.name))
            .map(|c| c.name.as_str())
            .collect();
        if !surviving.is_empty() {
            self.execute(self.ddl.insert_select(&temp, table, &surviving))
                .await?;
        }

        self.execute(self.ddl.drop_table(table)).await?;
        self.execute(self.ddl.rename_table(&temp, table)).await?;
        Ok(())
    }

    /// Picks a temporary table name that is free in the live database,
    /// starting from `{table}_backup` and appending a numeric suffix
    /// while the name is taken (e.g. by an orphan from an interrupted
    /// rebuild).
    async fn free_temp_name(&mut self, table: &str) -> Result<String> {
        let base = format!("{table}_backup");
        if !inspect::table_exists(&mut self.conn, &base).await? {
            return Ok(base);
        }
        let mut suffix = 1u32;
        loop {
            let candidate = format!("{base}_{suffix}");
            if !inspect::table_exists(&mut self.conn, &candidate).await? {
                return Ok(candidate);
            }
            suffix += 1;
        }
    }

    async fn execute(&mut self, sql: String) -> Result<()> {
        debug!(sql = %sql, "executing statement");
        let result = sqlx::query(&sql).execute(&mut self.conn).await;
        match result {
            Ok(_) => Ok(()),
            Err(source) => Err(SyncError::Ddl {
                statement: sql,
                source,
            }),
        }
    }
}
