//! Credential bundle storage trait.
//!
//! # Implementation Notes
//!
//! Implementations must:
//!
//! - Keep at most one bundle per owner
//! - Make `upsert` a single atomic replace: concurrent upserts for the same
//!   owner resolve to last-writer-wins, never to a mix of two generations
//! - Make `replace_rotated` a compare-and-swap on the owner's current
//!   refresh secret, so a rotation never resurrects a bundle that a login
//!   or logout has already replaced
//! - Match secrets exactly (no case folding or prefix matching)
//! - Report failures and timeouts as `AuthError::StoreUnavailable`
//!
//! # Security Considerations
//!
//! - Never log secrets
//! - Enforce uniqueness of access and refresh secrets across owners

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::{CredentialBundle, OwnerId};

/// Storage trait for credential bundles.
///
/// # Implementations
///
/// - [`InMemoryBundleStore`](crate::storage::memory::InMemoryBundleStore)
/// - PostgreSQL (in `sessionward-auth-postgres` crate)
#[async_trait]
pub trait BundleStore: Send + Sync {
    /// Replaces any bundle held by `bundle.owner_id` with `bundle`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundle cannot be stored.
    async fn upsert(&self, bundle: &CredentialBundle) -> AuthResult<()>;

    /// Replaces the owner's bundle with `bundle` only while the stored
    /// bundle still holds `bundle.refresh_secret`.
    ///
    /// Returns `false` and leaves the store unchanged if the owner has no
    /// bundle or holds a different refresh secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundle cannot be stored.
    async fn replace_rotated(&self, bundle: &CredentialBundle) -> AuthResult<bool>;

    /// Finds the bundle whose access secret equals `secret`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_access_secret(&self, secret: &str) -> AuthResult<Option<CredentialBundle>>;

    /// Finds the bundle whose refresh secret equals `secret`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_refresh_secret(&self, secret: &str)
    -> AuthResult<Option<CredentialBundle>>;

    /// Finds the bundle currently held by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_owner(&self, owner_id: OwnerId) -> AuthResult<Option<CredentialBundle>>;

    /// Removes any bundle held by `owner_id`.
    ///
    /// Deleting a missing bundle succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete(&self, owner_id: OwnerId) -> AuthResult<()>;
}
