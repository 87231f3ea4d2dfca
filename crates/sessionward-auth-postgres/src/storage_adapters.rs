//! Arc-owning storage adapters.
//!
//! These wrap the lifetime-based storage types and own an `Arc<PgPool>`, so
//! they can be shared as `Arc<dyn BundleStore>` / `Arc<dyn UserStore>`.

use std::sync::Arc;

use async_trait::async_trait;
use sessionward_auth::{AuthError, AuthResult, BundleStore, CredentialBundle, OwnerId, User, UserStore};

use crate::PgPool;
use crate::bundle::BundleStorage;
use crate::user::UserStorage;

// =============================================================================
// Bundle Store
// =============================================================================

/// PostgreSQL-backed [`BundleStore`].
#[derive(Clone)]
pub struct PostgresBundleStore {
    pool: Arc<PgPool>,
}

impl PostgresBundleStore {
    /// Create a new Arc-owning bundle store.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BundleStore for PostgresBundleStore {
    async fn upsert(&self, bundle: &CredentialBundle) -> AuthResult<()> {
        BundleStorage::new(&self.pool)
            .upsert(bundle)
            .await
            .map_err(AuthError::from)
    }

    async fn replace_rotated(&self, bundle: &CredentialBundle) -> AuthResult<bool> {
        BundleStorage::new(&self.pool)
            .replace_rotated(bundle)
            .await
            .map_err(AuthError::from)
    }

    async fn find_by_access_secret(&self, secret: &str) -> AuthResult<Option<CredentialBundle>> {
        BundleStorage::new(&self.pool)
            .find_by_access_token(secret)
            .await
            .map_err(AuthError::from)
    }

    async fn find_by_refresh_secret(
        &self,
        secret: &str,
    ) -> AuthResult<Option<CredentialBundle>> {
        BundleStorage::new(&self.pool)
            .find_by_refresh_token(secret)
            .await
            .map_err(AuthError::from)
    }

    async fn find_by_owner(&self, owner_id: OwnerId) -> AuthResult<Option<CredentialBundle>> {
        BundleStorage::new(&self.pool)
            .find_by_user_id(owner_id.as_uuid())
            .await
            .map_err(AuthError::from)
    }

    async fn delete(&self, owner_id: OwnerId) -> AuthResult<()> {
        BundleStorage::new(&self.pool)
            .delete_by_user_id(owner_id.as_uuid())
            .await
            .map_err(AuthError::from)
    }
}

// =============================================================================
// User Store
// =============================================================================

/// PostgreSQL-backed [`UserStore`].
#[derive(Clone)]
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    /// Create a new Arc-owning user store.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn create(&self, user: &User) -> AuthResult<User> {
        UserStorage::new(&self.pool)
            .create(user)
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    AuthError::user_exists(&user.username)
                } else {
                    AuthError::from(e)
                }
            })
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        UserStorage::new(&self.pool)
            .find_by_username(username)
            .await
            .map_err(AuthError::from)
    }

    async fn find_by_id(&self, id: OwnerId) -> AuthResult<Option<User>> {
        UserStorage::new(&self.pool)
            .find_by_id(id.as_uuid())
            .await
            .map_err(AuthError::from)
    }
}
