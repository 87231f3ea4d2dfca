//! Access secret validation.
//!
//! Each protected request presents an access secret and its anti-forgery
//! companion. Validation runs a fixed sequence of gates:
//!
//! 1. both secrets present
//! 2. access secret resolves to a stored bundle
//! 3. bundle not expired
//! 4. anti-forgery secret matches (constant time)
//!
//! An unknown access secret and a wrong anti-forgery secret produce the same
//! `InvalidCredential` error.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::debug;

use crate::AuthResult;
use crate::error::AuthError;
use crate::secret::constant_time_eq;
use crate::storage::BundleStore;
use crate::types::OwnerId;

/// Resolves presented credentials to their owner.
#[derive(Clone)]
pub struct Authorizer {
    store: Arc<dyn BundleStore>,
}

impl Authorizer {
    /// Creates an authorizer over a bundle store.
    #[must_use]
    pub fn new(store: Arc<dyn BundleStore>) -> Self {
        Self { store }
    }

    /// Validates an access / anti-forgery pair against the current time.
    ///
    /// # Errors
    ///
    /// - `MissingCredential` if either secret is empty
    /// - `InvalidCredential` if the access secret is unknown or the
    ///   anti-forgery secret does not match
    /// - `CredentialExpired` if the bundle is past its expiry
    /// - `StoreUnavailable` if the lookup fails
    pub async fn authorize(&self, access: &str, anti_forgery: &str) -> AuthResult<OwnerId> {
        self.authorize_at(access, anti_forgery, OffsetDateTime::now_utc())
            .await
    }

    /// Validates an access / anti-forgery pair as of `now`.
    ///
    /// # Errors
    ///
    /// Same as [`Authorizer::authorize`].
    pub async fn authorize_at(
        &self,
        access: &str,
        anti_forgery: &str,
        now: OffsetDateTime,
    ) -> AuthResult<OwnerId> {
        if access.is_empty() || anti_forgery.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let bundle = self
            .store
            .find_by_access_secret(access)
            .await?
            .ok_or(AuthError::InvalidCredential)?;

        if bundle.is_expired_at(now) {
            debug!(owner_id = %bundle.owner_id, "Access secret expired");
            return Err(AuthError::CredentialExpired);
        }

        if !constant_time_eq(
            anti_forgery.as_bytes(),
            bundle.anti_forgery_secret.as_bytes(),
        ) {
            debug!(owner_id = %bundle.owner_id, "Anti-forgery secret mismatch");
            return Err(AuthError::InvalidCredential);
        }

        Ok(bundle.owner_id)
    }
}
