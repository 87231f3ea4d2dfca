//! Authentication error types.
//!
//! Every failure of the token lifecycle is reported through [`AuthError`].
//! Credential comparison failures all collapse into
//! [`AuthError::InvalidCredential`] so callers cannot tell which part of a
//! presented credential was wrong.

use std::fmt;

/// Errors that can occur while issuing, validating, or rotating credentials.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The client omitted a required secret.
    #[error("Missing credential")]
    MissingCredential,

    /// The presented secret is unknown or does not match.
    #[error("Invalid credential")]
    InvalidCredential,

    /// The access secret is past its expiry instant.
    #[error("Credential expired")]
    CredentialExpired,

    /// A credential bundle could not be generated.
    #[error("Credential generation failed: {message}")]
    GenerationFailed {
        /// Description of the underlying failure.
        message: String,
    },

    /// The randomness source could not supply bytes.
    #[error("Entropy unavailable: {message}")]
    EntropyUnavailable {
        /// Description of the randomness failure.
        message: String,
    },

    /// The persistence collaborator failed or timed out.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// Description of the store failure.
        message: String,
    },

    /// The request is malformed or violates input rules.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// A user with this username is already registered.
    #[error("User already exists: {username}")]
    UserExists {
        /// The conflicting username.
        username: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `GenerationFailed` error.
    #[must_use]
    pub fn generation_failed(message: impl Into<String>) -> Self {
        Self::GenerationFailed {
            message: message.into(),
        }
    }

    /// Creates a new `EntropyUnavailable` error.
    #[must_use]
    pub fn entropy_unavailable(message: impl Into<String>) -> Self {
        Self::EntropyUnavailable {
            message: message.into(),
        }
    }

    /// Creates a new `StoreUnavailable` error.
    #[must_use]
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `UserExists` error.
    #[must_use]
    pub fn user_exists(username: impl Into<String>) -> Self {
        Self::UserExists {
            username: username.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if the client can fix this by changing its request.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential
                | Self::InvalidCredential
                | Self::CredentialExpired
                | Self::InvalidRequest { .. }
                | Self::UserExists { .. }
        )
    }

    /// Returns `true` if this is an infrastructure or server fault.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::GenerationFailed { .. }
                | Self::EntropyUnavailable { .. }
                | Self::StoreUnavailable { .. }
                | Self::Configuration { .. }
                | Self::Internal { .. }
        )
    }

    /// Returns `true` if the client should switch to the refresh flow.
    #[must_use]
    pub fn needs_refresh(&self) -> bool {
        matches!(self, Self::CredentialExpired)
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingCredential => ErrorCategory::Credential,
            Self::InvalidCredential => ErrorCategory::Credential,
            Self::CredentialExpired => ErrorCategory::Credential,
            Self::GenerationFailed { .. } => ErrorCategory::Entropy,
            Self::EntropyUnavailable { .. } => ErrorCategory::Entropy,
            Self::StoreUnavailable { .. } => ErrorCategory::Infrastructure,
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
            Self::UserExists { .. } => ErrorCategory::Validation,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns a stable machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidCredential => "invalid_credential",
            Self::CredentialExpired => "credential_expired",
            Self::GenerationFailed { .. } => "generation_failed",
            Self::EntropyUnavailable { .. } => "entropy_unavailable",
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::UserExists { .. } => "user_exists",
            Self::Configuration { .. } => "server_error",
            Self::Internal { .. } => "server_error",
        }
    }
}

/// Categories of authentication errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Presented credentials are missing, wrong, or expired.
    Credential,
    /// Randomness or secret generation failures.
    Entropy,
    /// Persistence failures.
    Infrastructure,
    /// Request validation errors.
    Validation,
    /// Configuration errors.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credential => write!(f, "credential"),
            Self::Entropy => write!(f, "entropy"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Validation => write!(f, "validation"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
