//! # sessionward-auth
//!
//! Credential bundle lifecycle for the Sessionward server.
//!
//! A signed-in user holds exactly one [`CredentialBundle`]: a short-lived
//! access secret, a long-lived refresh secret, and an anti-forgery secret
//! that must accompany the access secret on every protected request.
//!
//! This crate provides:
//! - Secret generation from the operating system's CSPRNG
//! - Bundle issuance, validation and refresh-driven rotation
//! - Storage traits with in-memory implementations
//! - Argon2id password hashing
//! - Axum extractors and error responses
//!
//! ## Modules
//!
//! - [`secret`] - random secrets and constant-time comparison
//! - [`token`] - issuer, authorizer and rotator
//! - [`storage`] - bundle and user storage traits
//! - [`service`] - register / login / refresh / logout orchestration
//! - [`password`] - password hashing
//! - [`middleware`] - HTTP extractors and error responses
//! - [`config`] - issuance configuration

pub mod config;
pub mod error;
pub mod middleware;
pub mod password;
pub mod secret;
pub mod service;
pub mod storage;
pub mod token;
pub mod types;

pub use config::{ConfigError, PasswordConfig, TokenConfig};
pub use error::{AuthError, ErrorCategory};
pub use middleware::{AuthState, PresentedCredentials, SessionAuth};
pub use secret::{EntropySource, OsEntropy, SecretGenerator, constant_time_eq};
pub use service::SessionService;
pub use storage::{
    BundleStore, InMemoryBundleStore, InMemoryUserStore, User, UserStore,
};
pub use token::{Authorizer, Rotator, TokenIssuer};
pub use types::{CredentialBundle, OwnerId};

/// Type alias for authentication results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use sessionward_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{ConfigError, PasswordConfig, TokenConfig};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::middleware::{AuthState, PresentedCredentials, SessionAuth};
    pub use crate::service::SessionService;
    pub use crate::storage::{BundleStore, User, UserStore};
    pub use crate::token::{Authorizer, Rotator, TokenIssuer};
    pub use crate::types::{CredentialBundle, OwnerId};
}
