//! Database connection pool management
//!
//! Wraps SQLx's `SqlitePool` for the share record store. File databases
//! run in WAL mode with a busy timeout so listings can proceed while a
//! write is in flight; the in-memory variant keeps a single connection
//! because SQLite in-memory databases are per-connection.

use std::path::Path;
use std::time::Duration;

use fedshare_core::config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::CacheError;

/// Maximum connections for file-backed databases
const MAX_CONNECTIONS: u32 = 5;

/// How long a writer waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Schema applied on every connect; statements are idempotent
const SCHEMA: &str = include_str!("migrations/20260301_initial.sql");

/// Pool of SQLite connections holding the `share_external` table
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Opens (or creates) the database file at `db_path` and applies the schema
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the file cannot be opened,
    /// or `CacheError::MigrationFailed` if the schema cannot be applied.
    pub async fn new(db_path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                CacheError::ConnectionFailed(format!(
                    "Failed to create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| {
                CacheError::ConnectionFailed(format!(
                    "Failed to connect to database at {}: {e}",
                    db_path.display()
                ))
            })?;

        Self::apply_schema(&pool).await?;

        tracing::info!(path = %db_path.display(), "Share store opened");

        Ok(Self { pool })
    }

    /// Opens the database named by the `database` config section
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, CacheError> {
        Self::new(&config.path).await
    }

    /// Creates an in-memory database for tests
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the connection cannot be established,
    /// or `CacheError::MigrationFailed` if the schema cannot be applied.
    pub async fn in_memory() -> Result<Self, CacheError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| {
                CacheError::ConnectionFailed(format!("Failed to create in-memory database: {e}"))
            })?;

        Self::apply_schema(&pool).await?;

        tracing::debug!("In-memory share store initialized");

        Ok(Self { pool })
    }

    /// Returns a reference to the underlying SQLite connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn apply_schema(pool: &SqlitePool) -> Result<(), CacheError> {
        sqlx::raw_sql(SCHEMA).execute(pool).await.map_err(|e| {
            CacheError::MigrationFailed(format!("Failed to apply share_external schema: {e}"))
        })?;

        tracing::debug!("Share store schema applied");
        Ok(())
    }
}
