//! Embedded PostgreSQL helpers for the Diesel adapter suites.
//!
//! Each test gets a temporary database on one shared cluster, migrated with
//! the embedded Diesel migrations. Schema inspection and teardown run over a
//! synchronous `PgConnection` so they never need a Tokio runtime.

use std::time::Duration;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};

/// Embedded migrations from the backend/migrations directory.
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Returns true when `SKIP_TEST_CLUSTER` is "1", "true" or "yes".
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skips the test when `SKIP_TEST_CLUSTER` is truthy, otherwise panics so CI
/// breakage is not masked.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt >= SHARED_CLUSTER_RETRIES => {
                return Err(format!("shared cluster: {error:?}"));
            }
            Err(_) => {
                std::thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

fn establish(url: &str) -> Result<PgConnection, String> {
    PgConnection::establish(url).map_err(|err| format!("connect: {err}"))
}

/// Runs all pending Diesel migrations against the database at `url`.
pub fn migrate_schema(url: &str) -> Result<(), String> {
    let mut conn = establish(url)?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migration: {err}"))?;
    Ok(())
}

/// Creates a migrated temporary database, dropped with the returned guard.
pub fn provision_database() -> Result<TemporaryDatabase, String> {
    let cluster = shared_cluster()?;
    let database = cluster
        .create_temporary_database()
        .map_err(|err| format!("create database: {err:?}"))?;
    migrate_schema(database.url())?;
    Ok(database)
}

#[derive(QueryableByName)]
struct RowCount {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Rows in `table` whose `name` column equals `name`.
pub fn count_named(url: &str, table: &str, name: &str) -> Result<i64, String> {
    let mut conn = establish(url)?;
    diesel::sql_query(format!(
        "SELECT count(*) AS count FROM {table} WHERE name = $1"
    ))
    .bind::<Text, _>(name)
    .get_result::<RowCount>(&mut conn)
    .map(|row| row.count)
    .map_err(|err| format!("count {table}: {err}"))
}

/// Drops `table` so the next statement touching it fails mid-transaction.
pub fn drop_table(url: &str, table: &str) -> Result<(), String> {
    let mut conn = establish(url)?;
    diesel::sql_query(format!("DROP TABLE IF EXISTS {table} CASCADE"))
        .execute(&mut conn)
        .map(|_| ())
        .map_err(|err| format!("drop {table}: {err}"))
}
