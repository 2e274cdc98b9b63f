//! Live-schema inspection.
//!
//! Reads what the database actually contains: table existence via a
//! `sqlite_master` probe and column layouts via `PRAGMA table_xinfo`
//! (or `table_info` on backends without generated-column support).
//! Every call returns a materialized row list; nothing is cached, so
//! schema changes made between calls are always picked up.

use sqlx::sqlite::SqliteConnection;
use sqlx::Row;
use syncline_schema::{BackendCapabilities, ColumnInfo, GeneratedKind, SqliteDdl};

use crate::error::{Result, SyncError};

/// Returns whether a table with the given name exists.
///
/// # Errors
///
/// Any backend error is fatal for the current synchronization call
/// and surfaced as [`SyncError::Introspection`].
pub async fn table_exists(conn: &mut SqliteConnection, table: &str) -> Result<bool> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|source| SyncError::Introspection {
                table: table.to_string(),
                source,
            })?;
    Ok(row.is_some())
}

/// Returns the table's columns in on-disk order, or an empty list if
/// the table does not exist (which is not an error).
///
/// With generated-column support the richer `table_xinfo` pragma is
/// used so that generated columns are reported; rows describing
/// virtual-table internals (`hidden = 1`) are skipped.
///
/// # Errors
///
/// Any backend error is fatal and surfaced as
/// [`SyncError::Introspection`].
pub async fn table_columns(
    conn: &mut SqliteConnection,
    table: &str,
    caps: &BackendCapabilities,
) -> Result<Vec<ColumnInfo>> {
    let pragma = if caps.generated_columns {
        "table_xinfo"
    } else {
        "table_info"
    };
    let sql = format!(
        "PRAGMA {pragma}({})",
        SqliteDdl::new().quote_identifier(table)
    );

    let introspection = |source| SyncError::Introspection {
        table: table.to_string(),
        source,
    };

    let rows = sqlx::query(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(introspection)?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        let hidden: i64 = if caps.generated_columns {
            row.try_get("hidden").map_err(introspection)?
        } else {
            0
        };
        if hidden == 1 {
            continue;
        }
        let not_null: i64 = row.try_get("notnull").map_err(introspection)?;
        columns.push(ColumnInfo {
            ordinal: row.try_get("cid").map_err(introspection)?,
            name: row.try_get("name").map_err(introspection)?,
            declared_type: row.try_get("type").map_err(introspection)?,
            not_null: not_null != 0,
            default_value: row.try_get("dflt_value").map_err(introspection)?,
            pk_position: row.try_get("pk").map_err(introspection)?,
            generated: match hidden {
                2 => Some(GeneratedKind::Virtual),
                3 => Some(GeneratedKind::Stored),
                _ => None,
            },
        });
    }
    Ok(columns)
}
