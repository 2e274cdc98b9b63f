//! Backend capability detection.
//!
//! The original design gated features on the linked library's version
//! at compile time; here the connected database reports its version
//! once at startup and the result travels with the
//! [`Synchronizer`](crate::Synchronizer) as explicit flags.

use sqlx::sqlite::SqliteConnection;
use syncline_schema::BackendCapabilities;

use crate::error::{Result, SyncError};

/// Queries `sqlite_version()` and resolves the capability flags.
///
/// # Errors
///
/// Returns [`SyncError::Version`] if the reported version string is
/// not a dotted number triple, or [`SyncError::Database`] if the
/// query itself fails.
pub async fn detect_capabilities(conn: &mut SqliteConnection) -> Result<BackendCapabilities> {
    let (version,): (String,) = sqlx::query_as("SELECT sqlite_version()")
        .fetch_one(&mut *conn)
        .await?;
    let (major, minor, patch) =
        parse_version(&version).ok_or(SyncError::Version(version))?;
    Ok(BackendCapabilities::from_version(major, minor, patch))
}

/// Parses `"3.45.1"` into `(3, 45, 1)`. A missing patch component
/// defaults to zero.
fn parse_version(version: &str) -> Option<(u32, u32, u32)> {
    let mut parts = version.trim().split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = match parts.next() {
        Some(p) => p.parse().ok()?,
        None => 0,
    };
    Some((major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Connection;

    #[test]
    fn parse_version_triples() {
        assert_eq!(parse_version("3.45.1"), Some((3, 45, 1)));
        assert_eq!(parse_version("3.31.0"), Some((3, 31, 0)));
        assert_eq!(parse_version("3.25"), Some((3, 25, 0)));
        assert_eq!(parse_version("three.four"), None);
        assert_eq!(parse_version(""), None);
    }

    #[tokio::test]
    async fn detect_against_live_connection() {
        let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        let caps = detect_capabilities(&mut conn).await.unwrap();
        // The bundled SQLite is well past 3.35.
        assert!(caps.drop_column);
        assert!(caps.generated_columns);
        assert!(caps.rename_column);
    }
}
