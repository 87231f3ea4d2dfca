//! PostgreSQL storage backend for Sessionward auth.
//!
//! Provides persistent storage for:
//!
//! - Users (`users` table)
//! - Credential bundles (`auth_tokens` table, one row per user)
//!
//! The schema ships as embedded migrations; see [`migrations`].
//!
//! # Example
//!
//! ```ignore
//! use sessionward_auth_postgres::{PoolConfig, PostgresAuthStorage};
//!
//! let storage = PostgresAuthStorage::connect(&PoolConfig::new(url)).await?;
//! storage.migrate().await?;
//!
//! let bundles = storage.bundle_store();
//! let users = storage.user_store();
//! ```

pub mod bundle;
pub mod migrations;
pub mod pool;
pub mod storage_adapters;
pub mod user;

use std::sync::Arc;

use sessionward_auth::AuthError;
use sqlx_core::pool::Pool;
use sqlx_postgres::Postgres;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

pub use bundle::BundleStorage;
pub use pool::{PoolConfig, create_pool};
pub use storage_adapters::{PostgresBundleStore, PostgresUserStore};
pub use user::UserStorage;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during auth storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx_core::Error),

    /// A unique constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),
}

impl StorageError {
    /// Create a `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Returns `true` if this is a `Conflict` error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Returns `true` if this is a database error.
    #[must_use]
    pub fn is_database_error(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        AuthError::store_unavailable(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Maps unique violations to [`StorageError::Conflict`].
pub(crate) fn map_unique_violation(err: sqlx_core::Error, what: &str) -> StorageError {
    if let sqlx_core::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return StorageError::conflict(format!("{what} already exists"));
    }
    StorageError::from(err)
}

// =============================================================================
// PostgreSQL Auth Storage
// =============================================================================

/// PostgreSQL storage backend for users and credential bundles.
#[derive(Debug, Clone)]
pub struct PostgresAuthStorage {
    pool: Arc<PgPool>,
}

impl PostgresAuthStorage {
    /// Create new storage with an existing connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create new storage by connecting to the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn connect(config: &PoolConfig) -> StorageResult<Self> {
        let pool = create_pool(config).await?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// Applies pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails.
    pub async fn migrate(&self) -> StorageResult<()> {
        migrations::run(&self.pool).await
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get bundle storage operations.
    #[must_use]
    pub fn bundles(&self) -> BundleStorage<'_> {
        BundleStorage::new(&self.pool)
    }

    /// Get user storage operations.
    #[must_use]
    pub fn users(&self) -> UserStorage<'_> {
        UserStorage::new(&self.pool)
    }

    /// Returns an Arc-owning bundle store for the token core.
    #[must_use]
    pub fn bundle_store(&self) -> Arc<PostgresBundleStore> {
        Arc::new(PostgresBundleStore::new(Arc::clone(&self.pool)))
    }

    /// Returns an Arc-owning user store for the session service.
    #[must_use]
    pub fn user_store(&self) -> Arc<PostgresUserStore> {
        Arc::new(PostgresUserStore::new(Arc::clone(&self.pool)))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_conflict() {
        let err = StorageError::conflict("User 'alice' already exists");
        assert!(err.is_conflict());
        assert!(!err.is_database_error());
        assert_eq!(err.to_string(), "Conflict: User 'alice' already exists");
    }

    #[test]
    fn test_storage_error_maps_to_store_unavailable() {
        let err: AuthError = StorageError::Migration("boom".into()).into();
        assert!(matches!(err, AuthError::StoreUnavailable { .. }));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_database_error_conversion() {
        let err: StorageError = sqlx_core::Error::PoolTimedOut.into();
        assert!(err.is_database_error());
        let err: AuthError = err.into();
        assert!(err.is_server_error());
    }
}
