//! End-to-end synchronization tests against live SQLite databases.
//!
//! Each test drives the full pipeline — inspect, diff, plan, execute —
//! through [`Synchronizer`] and then verifies the resulting schema and
//! data with raw queries.

use sqlx::sqlite::SqliteConnection;
use sqlx::Connection;

use syncline_sqlite::prelude::*;

async fn memory() -> Synchronizer {
    Synchronizer::connect("sqlite::memory:").await.unwrap()
}

fn users_v1() -> TableMapping {
    TableMapping::new("users")
        .column(bigint("id").primary_key().autoincrement())
        .column(text("name").not_null())
}

fn users_with_age() -> TableMapping {
    TableMapping::new("users")
        .column(bigint("id").primary_key().autoincrement())
        .column(text("name").not_null())
        .column(integer("age").not_null().default(DefaultValue::Integer(0)))
}

fn orders_v1() -> TableMapping {
    TableMapping::new("orders")
        .column(bigint("id").primary_key().autoincrement())
        .column(integer("price").not_null())
}

#[tokio::test]
async fn creates_missing_table() {
    let mut sync = memory().await;

    let outcome = sync.synchronize(&users_v1(), false).await.unwrap();
    assert_eq!(outcome, SyncOutcome::NewTableCreated);

    assert!(sync.table_exists("users").await.unwrap());
    // The live layout matches the declared one descriptor-for-descriptor.
    let live = sync.table_columns("users").await.unwrap();
    assert_eq!(live, users_v1().column_info());
}

#[tokio::test]
async fn repeated_synchronization_is_idempotent() {
    let mut sync = memory().await;
    sync.synchronize(&users_v1(), false).await.unwrap();

    for _ in 0..3 {
        let outcome = sync.synchronize(&users_v1(), false).await.unwrap();
        assert_eq!(outcome, SyncOutcome::AlreadyInSync);
    }
}

#[tokio::test]
async fn adds_column_with_default_and_backfills_existing_rows() {
    let mut sync = memory().await;
    sync.synchronize(&users_v1(), false).await.unwrap();
    sqlx::query("INSERT INTO users (name) VALUES ('ada'), ('grace')")
        .execute(sync.connection())
        .await
        .unwrap();

    let outcome = sync.synchronize(&users_with_age(), false).await.unwrap();
    assert_eq!(outcome, SyncOutcome::NewColumnsAdded);

    let rows: Vec<(String, i64)> = sqlx::query_as("SELECT name, age FROM users ORDER BY id")
        .fetch_all(sync.connection())
        .await
        .unwrap();
    assert_eq!(
        rows,
        vec![("ada".to_string(), 0), ("grace".to_string(), 0)]
    );

    // And the evolved table is now stable.
    let outcome = sync.synchronize(&users_with_age(), false).await.unwrap();
    assert_eq!(outcome, SyncOutcome::AlreadyInSync);
}

#[tokio::test]
async fn not_null_column_without_default_forces_rebuild() {
    let mut sync = memory().await;
    sync.synchronize(&users_v1(), false).await.unwrap();

    let with_email = TableMapping::new("users")
        .column(bigint("id").primary_key().autoincrement())
        .column(text("name").not_null())
        .column(text("email").not_null());
    let outcome = sync.synchronize(&with_email, false).await.unwrap();
    assert_eq!(outcome, SyncOutcome::DroppedAndRecreated);

    let live = sync.table_columns("users").await.unwrap();
    assert_eq!(live, with_email.column_info());
}

#[tokio::test]
async fn nullability_change_rebuilds_and_preserves_rows() {
    let mut sync = memory().await;
    let nullable_name = TableMapping::new("users")
        .column(bigint("id").primary_key())
        .column(text("name"));
    sync.synchronize(&nullable_name, false).await.unwrap();
    sqlx::query("INSERT INTO users (id, name) VALUES (1, 'ada'), (2, 'grace')")
        .execute(sync.connection())
        .await
        .unwrap();

    let required_name = TableMapping::new("users")
        .column(bigint("id").primary_key())
        .column(text("name").not_null());
    let outcome = sync.synchronize(&required_name, false).await.unwrap();
    assert_eq!(outcome, SyncOutcome::DroppedAndRecreated);

    let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM users ORDER BY id")
        .fetch_all(sync.connection())
        .await
        .unwrap();
    assert_eq!(
        rows,
        vec![(1, "ada".to_string()), (2, "grace".to_string())]
    );
    assert!(sync.table_columns("users").await.unwrap()[1].not_null);
}

#[tokio::test]
async fn default_presence_change_rebuilds() {
    let mut sync = memory().await;
    sync.synchronize(&users_v1(), false).await.unwrap();
    sqlx::query("INSERT INTO users (name) VALUES ('ada')")
        .execute(sync.connection())
        .await
        .unwrap();

    let with_default = TableMapping::new("users")
        .column(bigint("id").primary_key().autoincrement())
        .column(text("name").not_null().default_expr("'unknown'"));
    let outcome = sync.synchronize(&with_default, false).await.unwrap();
    assert_eq!(outcome, SyncOutcome::DroppedAndRecreated);

    let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM users")
        .fetch_all(sync.connection())
        .await
        .unwrap();
    assert_eq!(rows, vec![("ada".to_string(),)]);
}

async fn seed_users_with_legacy_column(conn: &mut SqliteConnection) {
    sqlx::query(
        "CREATE TABLE users (\
         id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, \
         name TEXT NOT NULL, \
         legacy_col TEXT)",
    )
    .execute(&mut *conn)
    .await
    .unwrap();
    sqlx::query("INSERT INTO users (name, legacy_col) VALUES ('ada', 'x'), ('grace', 'y')")
        .execute(&mut *conn)
        .await
        .unwrap();
}

#[tokio::test]
async fn excess_column_dropped_natively() {
    let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
    seed_users_with_legacy_column(&mut conn).await;
    let mut sync = Synchronizer::new(conn, BackendCapabilities::default());

    let outcome = sync.synchronize(&users_v1(), false).await.unwrap();
    assert_eq!(outcome, SyncOutcome::OldColumnsRemoved);

    let live = sync.table_columns("users").await.unwrap();
    assert!(live.iter().all(|c| c.name != "legacy_col"));
    let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM users ORDER BY id")
        .fetch_all(sync.connection())
        .await
        .unwrap();
    assert_eq!(
        rows,
        vec![(1, "ada".to_string()), (2, "grace".to_string())]
    );
}

#[tokio::test]
async fn excess_column_without_drop_support_rebuilds() {
    let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
    seed_users_with_legacy_column(&mut conn).await;
    // Pretend the backend predates native DROP COLUMN.
    let caps = BackendCapabilities::from_version(3, 30, 0);
    let mut sync = Synchronizer::new(conn, caps);

    let outcome = sync.synchronize(&users_v1(), false).await.unwrap();
    assert_eq!(outcome, SyncOutcome::DroppedAndRecreated);

    let live = sync.table_columns("users").await.unwrap();
    assert!(live.iter().all(|c| c.name != "legacy_col"));
    let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM users ORDER BY id")
        .fetch_all(sync.connection())
        .await
        .unwrap();
    assert_eq!(
        rows,
        vec![(1, "ada".to_string()), (2, "grace".to_string())]
    );
}

#[tokio::test]
async fn preserved_excess_columns_survive_untouched() {
    let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
    seed_users_with_legacy_column(&mut conn).await;
    let mut sync = Synchronizer::new(conn, BackendCapabilities::default());

    let outcome = sync.synchronize(&users_v1(), true).await.unwrap();
    assert_eq!(outcome, SyncOutcome::OldColumnsRemoved);

    let rows: Vec<(String, Option<String>)> =
        sqlx::query_as("SELECT name, legacy_col FROM users ORDER BY id")
            .fetch_all(sync.connection())
            .await
            .unwrap();
    assert_eq!(
        rows,
        vec![
            ("ada".to_string(), Some("x".to_string())),
            ("grace".to_string(), Some("y".to_string())),
        ]
    );
}

#[tokio::test]
async fn adds_and_drops_combine_in_one_call() {
    let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
    seed_users_with_legacy_column(&mut conn).await;
    let mut sync = Synchronizer::new(conn, BackendCapabilities::default());

    let outcome = sync.synchronize(&users_with_age(), false).await.unwrap();
    assert_eq!(outcome, SyncOutcome::NewColumnsAddedAndOldColumnsRemoved);

    let rows: Vec<(String, i64)> = sqlx::query_as("SELECT name, age FROM users ORDER BY id")
        .fetch_all(sync.connection())
        .await
        .unwrap();
    assert_eq!(
        rows,
        vec![("ada".to_string(), 0), ("grace".to_string(), 0)]
    );
}

#[tokio::test]
async fn virtual_generated_column_is_added_in_place() {
    let mut sync = memory().await;
    sync.synchronize(&orders_v1(), false).await.unwrap();
    sqlx::query("INSERT INTO orders (price) VALUES (10), (25)")
        .execute(sync.connection())
        .await
        .unwrap();

    let with_total = TableMapping::new("orders")
        .column(bigint("id").primary_key().autoincrement())
        .column(integer("price").not_null())
        .column(integer("total").generated_virtual("price * 2"));
    let outcome = sync.synchronize(&with_total, false).await.unwrap();
    assert_eq!(outcome, SyncOutcome::NewColumnsAdded);

    let rows: Vec<(i64, i64)> = sqlx::query_as("SELECT price, total FROM orders ORDER BY id")
        .fetch_all(sync.connection())
        .await
        .unwrap();
    assert_eq!(rows, vec![(10, 20), (25, 50)]);

    // The generated column round-trips through introspection.
    let outcome = sync.synchronize(&with_total, false).await.unwrap();
    assert_eq!(outcome, SyncOutcome::AlreadyInSync);
}

#[tokio::test]
async fn stored_generated_column_forces_rebuild() {
    let mut sync = memory().await;
    sync.synchronize(&orders_v1(), false).await.unwrap();
    sqlx::query("INSERT INTO orders (price) VALUES (10), (25)")
        .execute(sync.connection())
        .await
        .unwrap();

    let with_total = TableMapping::new("orders")
        .column(bigint("id").primary_key().autoincrement())
        .column(integer("price").not_null())
        .column(integer("total").generated_stored("price * 3"));
    let outcome = sync.synchronize(&with_total, false).await.unwrap();
    assert_eq!(outcome, SyncOutcome::DroppedAndRecreated);

    let rows: Vec<(i64, i64)> = sqlx::query_as("SELECT price, total FROM orders ORDER BY id")
        .fetch_all(sync.connection())
        .await
        .unwrap();
    assert_eq!(rows, vec![(10, 30), (25, 75)]);
}

#[tokio::test]
async fn empty_mapping_is_rejected_before_any_ddl() {
    let mut sync = memory().await;
    let err = sync
        .synchronize(&TableMapping::new("ghost"), false)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Mapping(_)));
    assert!(!sync.table_exists("ghost").await.unwrap());
}

#[tokio::test]
async fn synchronize_all_reports_one_outcome_per_table() {
    let mut sync = memory().await;
    sync.synchronize(&users_v1(), false).await.unwrap();

    let outcomes = sync
        .synchronize_all(&[users_v1(), orders_v1()], false)
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes["users"], SyncOutcome::AlreadyInSync);
    assert_eq!(outcomes["orders"], SyncOutcome::NewTableCreated);
}

#[tokio::test]
async fn rebuild_avoids_occupied_backup_name() {
    let mut sync = memory().await;
    let nullable_name = TableMapping::new("users")
        .column(bigint("id").primary_key())
        .column(text("name"));
    sync.synchronize(&nullable_name, false).await.unwrap();
    sqlx::query("INSERT INTO users (id, name) VALUES (1, 'ada')")
        .execute(sync.connection())
        .await
        .unwrap();

    // An orphan from some interrupted run occupies the backup name.
    sqlx::query("CREATE TABLE users_backup (marker TEXT)")
        .execute(sync.connection())
        .await
        .unwrap();
    sqlx::query("INSERT INTO users_backup (marker) VALUES ('keep me')")
        .execute(sync.connection())
        .await
        .unwrap();

    let required_name = TableMapping::new("users")
        .column(bigint("id").primary_key())
        .column(text("name").not_null());
    let outcome = sync.synchronize(&required_name, false).await.unwrap();
    assert_eq!(outcome, SyncOutcome::DroppedAndRecreated);

    // The orphan is untouched and the fallback temp name is gone.
    let markers: Vec<(String,)> = sqlx::query_as("SELECT marker FROM users_backup")
        .fetch_all(sync.connection())
        .await
        .unwrap();
    assert_eq!(markers, vec![("keep me".to_string(),)]);
    assert!(!sync.table_exists("users_backup_1").await.unwrap());

    let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM users")
        .fetch_all(sync.connection())
        .await
        .unwrap();
    assert_eq!(rows, vec![(1, "ada".to_string())]);
}

#[tokio::test]
async fn schema_survives_reconnection() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("app.db").display());

    let mut sync = Synchronizer::connect(&url).await.unwrap();
    let outcome = sync.synchronize(&users_v1(), false).await.unwrap();
    assert_eq!(outcome, SyncOutcome::NewTableCreated);
    sync.into_inner().close().await.unwrap();

    let mut sync = Synchronizer::connect(&url).await.unwrap();
    let outcome = sync.synchronize(&users_v1(), false).await.unwrap();
    assert_eq!(outcome, SyncOutcome::AlreadyInSync);
}
