//! Session orchestration.
//!
//! [`SessionService`] ties users to credential bundles: registration,
//! password login, refresh, request authorization and logout. HTTP handlers
//! call into this type and never touch the stores directly.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::AuthResult;
use crate::config::{PasswordConfig, TokenConfig};
use crate::error::AuthError;
use crate::password::{hash_password, verify_password};
use crate::secret::SecretGenerator;
use crate::storage::{BundleStore, User, UserStore};
use crate::token::{Authorizer, Rotator, TokenIssuer};
use crate::types::CredentialBundle;

/// Minimum length, in characters, of usernames and passwords.
pub const MIN_CREDENTIAL_LEN: usize = 8;

/// User-facing session operations.
#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UserStore>,
    bundles: Arc<dyn BundleStore>,
    issuer: TokenIssuer,
    authorizer: Authorizer,
    rotator: Rotator,
}

impl SessionService {
    /// Creates a service that draws secrets from the operating system.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        bundles: Arc<dyn BundleStore>,
        config: TokenConfig,
    ) -> Self {
        Self::with_generator(users, bundles, SecretGenerator::new(), config)
    }

    /// Creates a service with a specific secret generator.
    #[must_use]
    pub fn with_generator(
        users: Arc<dyn UserStore>,
        bundles: Arc<dyn BundleStore>,
        generator: SecretGenerator,
        config: TokenConfig,
    ) -> Self {
        let issuer = TokenIssuer::new(generator, config);
        Self {
            authorizer: Authorizer::new(bundles.clone()),
            rotator: Rotator::new(bundles.clone(), issuer.clone()),
            users,
            bundles,
            issuer,
        }
    }

    /// Returns the issuance configuration.
    #[must_use]
    pub fn config(&self) -> &TokenConfig {
        self.issuer.config()
    }

    /// Registers a new user.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the username or password is too short
    /// - `UserExists` if the username is taken
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> AuthResult<User> {
        if username.chars().count() < MIN_CREDENTIAL_LEN
            || password.chars().count() < MIN_CREDENTIAL_LEN
        {
            return Err(AuthError::invalid_request(format!(
                "username and password must be at least {MIN_CREDENTIAL_LEN} characters"
            )));
        }

        let hash = self.hash(password).await?;
        let user = self.users.create(&User::new(username, hash)).await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Verifies a password and issues a fresh bundle, replacing any
    /// existing one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredential` for an unknown user or wrong password.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> AuthResult<(User, CredentialBundle)> {
        let Some(user) = self.users.find_by_username(username).await? else {
            // Burn comparable work so unknown users cost the same as bad passwords.
            let _ = self.hash(password).await;
            warn!("Login for unknown user");
            return Err(AuthError::InvalidCredential);
        };

        if !self.verify(password, &user.password_hash).await? {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(AuthError::InvalidCredential);
        }

        let bundle = self.issuer.issue(user.id)?;
        self.bundles.upsert(&bundle).await?;

        info!(user_id = %user.id, expires_at = %bundle.expires_at, "User logged in");
        Ok((user, bundle))
    }

    /// Rotates the bundle of `username` using its refresh secret.
    ///
    /// # Errors
    ///
    /// - `MissingCredential` if `refresh` is empty
    /// - `InvalidCredential` if the user is unknown or the refresh secret
    ///   does not belong to them
    #[instrument(skip(self, refresh))]
    pub async fn refresh(&self, username: &str, refresh: &str) -> AuthResult<CredentialBundle> {
        if refresh.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredential)?;

        self.rotator.rotate(refresh, user.id).await
    }

    /// Resolves an access / anti-forgery pair to its user.
    ///
    /// # Errors
    ///
    /// Propagates [`Authorizer::authorize`] errors. A bundle whose owner no
    /// longer exists is `InvalidCredential`.
    pub async fn authorize(&self, access: &str, anti_forgery: &str) -> AuthResult<User> {
        let owner_id = self.authorizer.authorize(access, anti_forgery).await?;
        self.users
            .find_by_id(owner_id)
            .await?
            .ok_or(AuthError::InvalidCredential)
    }

    /// Revokes the caller's bundle.
    ///
    /// # Errors
    ///
    /// Same as [`SessionService::authorize`].
    pub async fn logout(&self, access: &str, anti_forgery: &str) -> AuthResult<User> {
        let user = self.authorize(access, anti_forgery).await?;
        self.bundles.delete(user.id).await?;

        info!(user_id = %user.id, "User logged out");
        Ok(user)
    }

    async fn hash(&self, password: &str) -> AuthResult<String> {
        let password = password.to_owned();
        let config: PasswordConfig = self.issuer.config().password.clone();
        tokio::task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .map_err(|e| AuthError::internal(format!("hashing task: {e}")))?
    }

    async fn verify(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::internal(format!("verification task: {e}")))?
    }
}
