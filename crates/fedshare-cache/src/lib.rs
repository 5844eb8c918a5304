//! fedshare Cache - Share record persistence
//!
//! SQLite-based store for federated share records.
//!
//! ## Architecture
//!
//! This crate implements the `IShareRepository` port from `fedshare-core`
//! using SQLite as the storage backend. It is a driven (secondary) adapter
//! in the hexagonal architecture.
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Connection pool with migration support
//! - [`SqliteShareRepository`] - Full `IShareRepository` implementation
//! - [`CacheError`] - Error types for cache operations
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use fedshare_cache::{DatabasePool, SqliteShareRepository};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::new(Path::new("/var/lib/fedshare/shares.db")).await?;
//! let repo = SqliteShareRepository::new(pool.pool().clone());
//! // Use repo as IShareRepository...
//! # Ok(())
//! # }
//! ```

pub mod pool;
pub mod repository;

pub use pool::DatabasePool;
pub use repository::SqliteShareRepository;

/// Errors that can occur during cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored row could not be turned back into domain types
    #[error("Invalid stored row: {0}")]
    InvalidRow(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(e: sqlx::Error) -> Self {
        CacheError::QueryFailed(e.to_string())
    }
}

impl From<fedshare_core::domain::DomainError> for CacheError {
    fn from(e: fedshare_core::domain::DomainError) -> Self {
        CacheError::InvalidRow(e.to_string())
    }
}
