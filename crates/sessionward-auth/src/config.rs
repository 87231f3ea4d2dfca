//! Token and password configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth]
//! access_token_lifetime = "15m"
//! access_secret_bytes = 32
//! refresh_secret_bytes = 64
//! anti_forgery_secret_bytes = 32
//!
//! [auth.password]
//! memory_kib = 19456
//! iterations = 2
//! parallelism = 1
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Smallest secret length accepted by [`TokenConfig::validate`].
pub const MIN_SECRET_BYTES: usize = 16;

/// Errors produced while validating auth configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A field holds an unusable value.
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        /// Offending field.
        field: &'static str,
        /// Why it is invalid.
        message: String,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}

/// Credential bundle issuance settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// How long an access secret is honoured after issuance.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Random bytes behind each access secret.
    pub access_secret_bytes: usize,

    /// Random bytes behind each refresh secret.
    /// Must exceed `access_secret_bytes`.
    pub refresh_secret_bytes: usize,

    /// Random bytes behind each anti-forgery secret.
    pub anti_forgery_secret_bytes: usize,

    /// Password hashing cost parameters.
    pub password: PasswordConfig,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::from_secs(15 * 60),
            access_secret_bytes: 32,
            refresh_secret_bytes: 64,
            anti_forgery_secret_bytes: 32,
            password: PasswordConfig::default(),
        }
    }
}

impl TokenConfig {
    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the lifetime is zero, any secret is shorter than
    /// [`MIN_SECRET_BYTES`], or the refresh secret is not longer than the
    /// access secret.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_token_lifetime.is_zero() {
            return Err(ConfigError::invalid(
                "access_token_lifetime",
                "must be greater than zero",
            ));
        }

        let lengths = [
            ("access_secret_bytes", self.access_secret_bytes),
            ("refresh_secret_bytes", self.refresh_secret_bytes),
            ("anti_forgery_secret_bytes", self.anti_forgery_secret_bytes),
        ];
        for (field, len) in lengths {
            if len < MIN_SECRET_BYTES {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be at least {MIN_SECRET_BYTES} bytes"),
                ));
            }
        }

        if self.refresh_secret_bytes <= self.access_secret_bytes {
            return Err(ConfigError::invalid(
                "refresh_secret_bytes",
                "must be longer than access_secret_bytes",
            ));
        }

        self.password.validate()
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        argon2::Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map(|_| ())
            .map_err(|e| ConfigError::invalid("password", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TokenConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.access_token_lifetime, Duration::from_secs(900));
        assert!(config.refresh_secret_bytes >= 2 * config.access_secret_bytes);
    }

    #[test]
    fn test_zero_lifetime_rejected() {
        let config = TokenConfig::default().with_access_token_lifetime(Duration::ZERO);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("access_token_lifetime"));
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = TokenConfig {
            anti_forgery_secret_bytes: 8,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("anti_forgery_secret_bytes"));
    }

    #[test]
    fn test_refresh_must_outgrow_access() {
        let config = TokenConfig {
            access_secret_bytes: 32,
            refresh_secret_bytes: 32,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("refresh_secret_bytes"));
    }

    #[test]
    fn test_deserialize_humantime() {
        let config: TokenConfig =
            serde_json::from_str(r#"{"access_token_lifetime": "1s"}"#).unwrap();
        assert_eq!(config.access_token_lifetime, Duration::from_secs(1));
        assert_eq!(config.refresh_secret_bytes, 64);
    }

    #[test]
    fn test_invalid_password_costs_rejected() {
        let config = TokenConfig {
            password: PasswordConfig {
                memory_kib: 1,
                iterations: 0,
                parallelism: 1,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
