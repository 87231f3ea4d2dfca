//! Credential bundle construction.
//!
//! The issuer only builds bundles; persisting them is the caller's job.

use time::{Duration, OffsetDateTime};

use crate::AuthResult;
use crate::config::TokenConfig;
use crate::error::AuthError;
use crate::secret::SecretGenerator;
use crate::types::{CredentialBundle, OwnerId};

/// Builds fresh credential bundles.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    generator: SecretGenerator,
    config: TokenConfig,
}

impl TokenIssuer {
    /// Creates an issuer bound to a generator and configuration.
    #[must_use]
    pub fn new(generator: SecretGenerator, config: TokenConfig) -> Self {
        Self { generator, config }
    }

    /// Returns the issuance configuration.
    #[must_use]
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Builds a bundle with three independently generated secrets.
    ///
    /// # Errors
    ///
    /// Returns `GenerationFailed` if any secret cannot be generated. No
    /// partially populated bundle is ever returned.
    pub fn issue(&self, owner_id: OwnerId) -> AuthResult<CredentialBundle> {
        let refresh_secret = self.secret(self.config.refresh_secret_bytes)?;
        self.build(owner_id, refresh_secret)
    }

    /// Builds a bundle that keeps the refresh secret of `existing`.
    ///
    /// Access and anti-forgery secrets and the expiry are fresh.
    ///
    /// # Errors
    ///
    /// Returns `GenerationFailed` if any secret cannot be generated.
    pub fn reissue_keeping_refresh(
        &self,
        existing: &CredentialBundle,
    ) -> AuthResult<CredentialBundle> {
        self.build(existing.owner_id, existing.refresh_secret.clone())
    }

    fn build(&self, owner_id: OwnerId, refresh_secret: String) -> AuthResult<CredentialBundle> {
        let access_secret = self.secret(self.config.access_secret_bytes)?;
        let anti_forgery_secret = self.secret(self.config.anti_forgery_secret_bytes)?;

        let lifetime = Duration::try_from(self.config.access_token_lifetime)
            .map_err(|e| AuthError::configuration(format!("access token lifetime: {e}")))?;
        if !lifetime.is_positive() {
            return Err(AuthError::configuration(
                "access token lifetime must be greater than zero",
            ));
        }

        let created_at = OffsetDateTime::now_utc();
        let expires_at = created_at
            .checked_add(lifetime)
            .ok_or_else(|| AuthError::configuration("access token lifetime overflows"))?;

        Ok(CredentialBundle {
            owner_id,
            access_secret,
            refresh_secret,
            anti_forgery_secret,
            expires_at,
            created_at,
        })
    }

    fn secret(&self, byte_len: usize) -> AuthResult<String> {
        self.generator.generate(byte_len).map_err(|e| {
            tracing::error!(error = %e, "Secret generation failed");
            AuthError::generation_failed(e.to_string())
        })
    }
}
