//! In-memory storage backends.
//!
//! Both stores keep all state behind a single `tokio::sync::RwLock`, so each
//! mutation (including the three index updates of a bundle upsert) happens
//! under one write guard and is never observed half-applied.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::bundle::BundleStore;
use crate::storage::user::{User, UserStore};
use crate::types::{CredentialBundle, OwnerId};

// =============================================================================
// Bundle Store
// =============================================================================

#[derive(Debug, Default)]
struct BundleIndex {
    by_owner: HashMap<OwnerId, CredentialBundle>,
    by_access: HashMap<String, OwnerId>,
    by_refresh: HashMap<String, OwnerId>,
}

impl BundleIndex {
    fn remove_owner(&mut self, owner_id: OwnerId) -> Option<CredentialBundle> {
        let old = self.by_owner.remove(&owner_id)?;
        self.by_access.remove(&old.access_secret);
        self.by_refresh.remove(&old.refresh_secret);
        Some(old)
    }

    fn replace(&mut self, bundle: &CredentialBundle) {
        let owner = bundle.owner_id;
        self.remove_owner(owner);
        self.by_access.insert(bundle.access_secret.clone(), owner);
        self.by_refresh.insert(bundle.refresh_secret.clone(), owner);
        self.by_owner.insert(owner, bundle.clone());
    }
}

fn bound_to_other(index: &HashMap<String, OwnerId>, secret: &str, owner: OwnerId) -> bool {
    index.get(secret).is_some_and(|holder| *holder != owner)
}

/// In-memory credential bundle store.
///
/// Suitable for tests and single-process deployments. State is lost on
/// restart.
#[derive(Debug, Default)]
pub struct InMemoryBundleStore {
    inner: RwLock<BundleIndex>,
}

impl InMemoryBundleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored bundles.
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_owner.len()
    }

    /// Returns `true` if no bundles are stored.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.by_owner.is_empty()
    }
}

#[async_trait]
impl BundleStore for InMemoryBundleStore {
    async fn upsert(&self, bundle: &CredentialBundle) -> AuthResult<()> {
        let mut inner = self.inner.write().await;
        let owner = bundle.owner_id;

        if bound_to_other(&inner.by_access, &bundle.access_secret, owner)
            || bound_to_other(&inner.by_refresh, &bundle.refresh_secret, owner)
        {
            return Err(AuthError::store_unavailable(
                "secret already bound to another owner",
            ));
        }

        inner.replace(bundle);
        Ok(())
    }

    async fn replace_rotated(&self, bundle: &CredentialBundle) -> AuthResult<bool> {
        let mut inner = self.inner.write().await;
        let holds_refresh = inner
            .by_owner
            .get(&bundle.owner_id)
            .is_some_and(|current| current.refresh_secret == bundle.refresh_secret);
        if !holds_refresh {
            return Ok(false);
        }

        if bound_to_other(&inner.by_access, &bundle.access_secret, bundle.owner_id) {
            return Err(AuthError::store_unavailable(
                "secret already bound to another owner",
            ));
        }

        inner.replace(bundle);
        Ok(true)
    }

    async fn find_by_access_secret(&self, secret: &str) -> AuthResult<Option<CredentialBundle>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_access
            .get(secret)
            .and_then(|owner| inner.by_owner.get(owner))
            .cloned())
    }

    async fn find_by_refresh_secret(
        &self,
        secret: &str,
    ) -> AuthResult<Option<CredentialBundle>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_refresh
            .get(secret)
            .and_then(|owner| inner.by_owner.get(owner))
            .cloned())
    }

    async fn find_by_owner(&self, owner_id: OwnerId) -> AuthResult<Option<CredentialBundle>> {
        Ok(self.inner.read().await.by_owner.get(&owner_id).cloned())
    }

    async fn delete(&self, owner_id: OwnerId) -> AuthResult<()> {
        self.inner.write().await.remove_owner(owner_id);
        Ok(())
    }
}

// =============================================================================
// User Store
// =============================================================================

#[derive(Debug, Default)]
struct UserIndex {
    by_id: HashMap<OwnerId, User>,
    by_username: HashMap<String, OwnerId>,
}

/// In-memory user store.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<UserIndex>,
}

impl InMemoryUserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: &User) -> AuthResult<User> {
        let mut inner = self.inner.write().await;
        if inner.by_username.contains_key(&user.username) {
            return Err(AuthError::user_exists(&user.username));
        }
        inner.by_username.insert(user.username.clone(), user.id);
        inner.by_id.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_username
            .get(username)
            .and_then(|id| inner.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: OwnerId) -> AuthResult<Option<User>> {
        Ok(self.inner.read().await.by_id.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, OffsetDateTime};
    use tokio_test::block_on;

    use super::*;

    fn bundle(owner_id: OwnerId, tag: &str) -> CredentialBundle {
        let now = OffsetDateTime::now_utc();
        CredentialBundle {
            owner_id,
            access_secret: format!("access-{tag}"),
            refresh_secret: format!("refresh-{tag}"),
            anti_forgery_secret: format!("csrf-{tag}"),
            expires_at: now + Duration::minutes(15),
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_lookup() {
        let store = InMemoryBundleStore::new();
        let owner = OwnerId::new();
        let b = bundle(owner, "one");
        store.upsert(&b).await.unwrap();

        let by_access = store.find_by_access_secret("access-one").await.unwrap();
        assert_eq!(by_access, Some(b.clone()));
        let by_refresh = store.find_by_refresh_secret("refresh-one").await.unwrap();
        assert_eq!(by_refresh, Some(b.clone()));
        assert_eq!(store.find_by_owner(owner).await.unwrap(), Some(b));
        assert!(store.find_by_access_secret("csrf-one").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_rotated_requires_current_refresh() {
        let store = InMemoryBundleStore::new();
        let owner = OwnerId::new();
        store.upsert(&bundle(owner, "a")).await.unwrap();

        let mut rotated = bundle(owner, "b");
        rotated.refresh_secret = "refresh-a".to_string();
        assert!(store.replace_rotated(&rotated).await.unwrap());
        assert!(store.find_by_access_secret("access-a").await.unwrap().is_none());
        assert_eq!(store.find_by_owner(owner).await.unwrap(), Some(rotated.clone()));

        // A login stored a bundle with a different refresh secret.
        let login = bundle(owner, "c");
        store.upsert(&login).await.unwrap();
        let mut stale = bundle(owner, "d");
        stale.refresh_secret = "refresh-a".to_string();
        assert!(!store.replace_rotated(&stale).await.unwrap());
        assert_eq!(store.find_by_owner(owner).await.unwrap(), Some(login));
        assert!(store.find_by_refresh_secret("refresh-a").await.unwrap().is_none());

        // Logged out: nothing to replace.
        store.delete(owner).await.unwrap();
        assert!(!store.replace_rotated(&stale).await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_upsert_replaces_previous_bundle() {
        let store = InMemoryBundleStore::new();
        let owner = OwnerId::new();
        store.upsert(&bundle(owner, "old")).await.unwrap();
        store.upsert(&bundle(owner, "new")).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert!(store.find_by_access_secret("access-old").await.unwrap().is_none());
        assert!(store.find_by_refresh_secret("refresh-old").await.unwrap().is_none());
        assert!(store.find_by_access_secret("access-new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_upsert_keeping_refresh_secret() {
        let store = InMemoryBundleStore::new();
        let owner = OwnerId::new();
        let first = bundle(owner, "a");
        store.upsert(&first).await.unwrap();

        let mut second = bundle(owner, "b");
        second.refresh_secret = first.refresh_secret.clone();
        store.upsert(&second).await.unwrap();

        let found = store.find_by_refresh_secret("refresh-a").await.unwrap();
        assert_eq!(found, Some(second));
    }

    #[tokio::test]
    async fn test_secret_collision_across_owners_rejected() {
        let store = InMemoryBundleStore::new();
        store.upsert(&bundle(OwnerId::new(), "same")).await.unwrap();

        let err = store.upsert(&bundle(OwnerId::new(), "same")).await.unwrap_err();
        assert!(matches!(err, AuthError::StoreUnavailable { .. }));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = InMemoryBundleStore::new();
        let owner = OwnerId::new();
        store.upsert(&bundle(owner, "x")).await.unwrap();

        store.delete(owner).await.unwrap();
        store.delete(owner).await.unwrap();
        assert!(store.is_empty().await);
        assert!(store.find_by_access_secret("access-x").await.unwrap().is_none());
    }

    #[test]
    fn test_user_lookup_blocking() {
        let store = InMemoryUserStore::new();
        let user = User::new("carol_white", "hash");
        block_on(store.create(&user)).unwrap();

        let found = block_on(store.find_by_id(user.id)).unwrap().unwrap();
        assert_eq!(found.username, "carol_white");
    }

    #[tokio::test]
    async fn test_user_store_rejects_duplicate_username() {
        let store = InMemoryUserStore::new();
        let user = User::new("alice_smith", "hash");
        store.create(&user).await.unwrap();

        let err = store
            .create(&User::new("alice_smith", "other"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserExists { .. }));

        let found = store.find_by_username("alice_smith").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(store.find_by_id(user.id).await.unwrap().is_some());
        assert!(store.find_by_username("bob_jones").await.unwrap().is_none());
    }
}
