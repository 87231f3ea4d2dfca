//! Refresh-driven bundle rotation.
//!
//! Rotation replaces the owner's bundle with one carrying fresh access and
//! anti-forgery secrets and a fresh expiry, while keeping the refresh secret
//! unchanged. The old access secret stops resolving once the new bundle is
//! stored. The store only accepts the rotated bundle while the owner still
//! holds the presented refresh secret, so a concurrent login or logout wins
//! over a rotation that read the older bundle.

use std::sync::Arc;

use tracing::{debug, info};

use crate::AuthResult;
use crate::error::AuthError;
use crate::secret::constant_time_eq;
use crate::storage::BundleStore;
use crate::token::issuer::TokenIssuer;
use crate::types::{CredentialBundle, OwnerId};

/// Exchanges a refresh secret for a new bundle.
#[derive(Clone)]
pub struct Rotator {
    store: Arc<dyn BundleStore>,
    issuer: TokenIssuer,
}

impl Rotator {
    /// Creates a rotator over a bundle store and issuer.
    #[must_use]
    pub fn new(store: Arc<dyn BundleStore>, issuer: TokenIssuer) -> Self {
        Self { store, issuer }
    }

    /// Rotates the bundle identified by `refresh` for `owner_id`.
    ///
    /// # Errors
    ///
    /// - `MissingCredential` if `refresh` is empty
    /// - `InvalidCredential` if no bundle holds `refresh`, it belongs to
    ///   another owner, or the stored secret does not match exactly
    /// - `GenerationFailed` if the new secrets cannot be generated
    ///   or the bundle was replaced or removed before the rotated one was
    ///   stored
    /// - `StoreUnavailable` if the lookup or upsert fails
    pub async fn rotate(&self, refresh: &str, owner_id: OwnerId) -> AuthResult<CredentialBundle> {
        if refresh.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let existing = self
            .store
            .find_by_refresh_secret(refresh)
            .await?
            .ok_or(AuthError::InvalidCredential)?;

        if existing.owner_id != owner_id {
            debug!(%owner_id, "Refresh secret presented for a different owner");
            return Err(AuthError::InvalidCredential);
        }

        // The lookup matched, but the store may not compare byte-exactly.
        if !constant_time_eq(refresh.as_bytes(), existing.refresh_secret.as_bytes()) {
            return Err(AuthError::InvalidCredential);
        }

        let rotated = self.issuer.reissue_keeping_refresh(&existing)?;
        if !self.store.replace_rotated(&rotated).await? {
            // A login or logout replaced the bundle after the lookup.
            debug!(%owner_id, "Bundle replaced during rotation");
            return Err(AuthError::InvalidCredential);
        }

        info!(%owner_id, expires_at = %rotated.expires_at, "Credential bundle rotated");
        Ok(rotated)
    }
}
