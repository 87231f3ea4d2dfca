//! Password hashing and verification.
//!
//! Passwords are hashed with Argon2id and stored as PHC strings, so the
//! cost parameters travel with each hash. Changing [`PasswordConfig`]
//! affects new hashes only; existing hashes keep verifying.
//!
//! # Example
//!
//! ```
//! use sessionward_auth::config::PasswordConfig;
//! use sessionward_auth::password::{hash_password, verify_password};
//!
//! let config = PasswordConfig::default();
//! let hash = hash_password("correct horse battery", &config).unwrap();
//!
//! assert!(verify_password("correct horse battery", &hash).unwrap());
//! assert!(!verify_password("wrong horse battery", &hash).unwrap());
//! ```

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use crate::AuthResult;
use crate::config::PasswordConfig;
use crate::error::AuthError;

/// Hashes a password with Argon2id using the configured cost.
///
/// # Errors
///
/// Returns `Configuration` if the cost parameters are rejected and
/// `Internal` if hashing itself fails.
pub fn hash_password(password: &str, config: &PasswordConfig) -> AuthResult<String> {
    let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
        .map_err(|e| AuthError::configuration(format!("password hashing parameters: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::internal(format!("password hashing failed: {e}")))?;

    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch.
///
/// # Errors
///
/// Returns `Internal` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> AuthResult<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| AuthError::internal(format!("stored hash: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::internal(format!("password verification: {e}"))),
    }
}
