//! Schema migration runner for the model database.
//!
//! Migrations are embedded at compile time via [`include_str!`] and executed
//! in version order. Each migration runs inside a transaction — a failure
//! rolls back cleanly with no partial schema state.
//!
//! The `schema_version` table tracks which migrations have been applied.
//! Running the migrator is idempotent: already-applied versions are skipped.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::errors::{Result, StoreError};

/// A single migration with a version number and SQL to execute.
struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

/// All migrations in version order.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "models table",
    sql: include_str!("v001_models.sql"),
}];

/// Run all pending migrations on the given connection.
///
/// Creates the `schema_version` table if it doesn't exist, then applies
/// each migration whose version exceeds the current maximum. Each migration
/// runs in its own transaction.
///
/// # Errors
///
/// Returns [`StoreError::Migration`] if any migration SQL fails.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    ensure_version_table(conn)?;
    let current = current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version <= current {
            debug!(
                version = migration.version,
                description = migration.description,
                "migration already applied, skipping"
            );
            continue;
        }

        info!(
            version = migration.version,
            description = migration.description,
            "applying migration"
        );

        apply_migration(conn, migration)?;
        applied += 1;
    }

    if applied > 0 {
        info!(applied, "migrations complete");
    }

    Ok(applied)
}

/// Return the highest applied migration version, or 0 if none.
pub fn current_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .map_err(|e| StoreError::Migration {
            message: format!("failed to read schema_version: {e}"),
        })?;
    Ok(version)
}

fn ensure_version_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
           version     INTEGER PRIMARY KEY,
           applied_at  TEXT    NOT NULL,
           description TEXT
         );",
    )
    .map_err(|e| StoreError::Migration {
        message: format!("failed to create schema_version table: {e}"),
    })?;
    Ok(())
}

fn apply_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    conn.execute_batch("BEGIN").map_err(|e| StoreError::Migration {
        message: format!("v{:03} begin failed: {e}", migration.version),
    })?;

    let result = conn
        .execute_batch(migration.sql)
        .and_then(|()| {
            conn.execute(
                "INSERT INTO schema_version (version, applied_at, description)
                 VALUES (?1, ?2, ?3)",
                rusqlite::params![
                    migration.version,
                    chrono::Utc::now().to_rfc3339(),
                    migration.description,
                ],
            )
            .map(|_| ())
        })
        .and_then(|()| conn.execute_batch("COMMIT"));

    if let Err(e) = result {
        let _ = conn.execute_batch("ROLLBACK");
        return Err(StoreError::Migration {
            message: format!("v{:03} failed: {e}", migration.version),
        });
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
