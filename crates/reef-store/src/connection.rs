//! `SQLite` connection pool with WAL mode and foreign keys enabled.
//!
//! Uses `r2d2` connection pooling with the `r2d2_sqlite` backend.
//! The [`PragmaCustomizer`] runs on each new connection to ensure
//! WAL mode, foreign keys, and performance pragmas are set.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::errors::Result;

/// Alias for the connection pool type.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Alias for a pooled connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Configuration for the connection pool.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Maximum pool size (default: 8).
    pub pool_size: u32,
    /// Busy timeout in milliseconds (default: 30000).
    pub busy_timeout_ms: u32,
    /// Cache size in KiB (default: 4096 = 4 MB).
    pub cache_size_kib: i64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            pool_size: 8,
            busy_timeout_ms: 30_000,
            cache_size_kib: 4096,
        }
    }
}

/// `SQLite` pragma customizer that runs on each new connection.
#[derive(Debug)]
struct PragmaCustomizer {
    busy_timeout_ms: u32,
    cache_size_kib: i64,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;\
             PRAGMA busy_timeout = {};\
             PRAGMA foreign_keys = ON;\
             PRAGMA cache_size = -{};\
             PRAGMA synchronous = NORMAL;",
            self.busy_timeout_ms, self.cache_size_kib
        ))?;
        Ok(())
    }
}

/// Create an in-memory connection pool (for testing).
///
/// The pool is capped at one connection so every caller sees the same
/// in-memory database.
pub fn new_in_memory(config: &ConnectionConfig) -> Result<ConnectionPool> {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder()
        .max_size(1)
        .connection_timeout(std::time::Duration::from_secs(5))
        .connection_customizer(Box::new(PragmaCustomizer {
            busy_timeout_ms: config.busy_timeout_ms,
            cache_size_kib: config.cache_size_kib,
        }))
        .build(manager)?;
    Ok(pool)
}

/// Create a file-backed connection pool.
pub fn new_file(path: &str, config: &ConnectionConfig) -> Result<ConnectionPool> {
    let manager = SqliteConnectionManager::file(path);
    let pool = Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(std::time::Duration::from_secs(5))
        .connection_customizer(Box::new(PragmaCustomizer {
            busy_timeout_ms: config.busy_timeout_ms,
            cache_size_kib: config.cache_size_kib,
        }))
        .build(manager)?;
    Ok(pool)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
