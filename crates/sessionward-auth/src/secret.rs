//! Secret generation and constant-time comparison.
//!
//! Secrets are raw bytes drawn from an [`EntropySource`] (the operating
//! system CSPRNG by default) and encoded as URL-safe base64 without padding,
//! so the encoded form is unambiguous and safe in headers and URLs.
//!
//! # Example
//!
//! ```
//! use sessionward_auth::secret::{SecretGenerator, constant_time_eq};
//!
//! let generator = SecretGenerator::new();
//! let secret = generator.generate(32).unwrap();
//! assert_eq!(secret.len(), 43); // 32 bytes, unpadded base64
//! assert!(constant_time_eq(secret.as_bytes(), secret.as_bytes()));
//! ```

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

use crate::AuthResult;
use crate::error::AuthError;

/// A source of cryptographically secure random bytes.
///
/// Implementations must either fill the whole buffer or return an error.
pub trait EntropySource: Send + Sync {
    /// Fills `dest` with random bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot supply bytes.
    fn fill(&self, dest: &mut [u8]) -> Result<(), rand::Error>;
}

/// Operating-system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), rand::Error> {
        OsRng.try_fill_bytes(dest)
    }
}

/// Produces opaque URL-safe secrets of a requested byte length.
#[derive(Clone)]
pub struct SecretGenerator {
    source: Arc<dyn EntropySource>,
}

impl SecretGenerator {
    /// Creates a generator backed by the operating-system CSPRNG.
    #[must_use]
    pub fn new() -> Self {
        Self::with_source(Arc::new(OsEntropy))
    }

    /// Creates a generator backed by a custom entropy source.
    #[must_use]
    pub fn with_source(source: Arc<dyn EntropySource>) -> Self {
        Self { source }
    }

    /// Generates a secret from `byte_len` random bytes.
    ///
    /// # Errors
    ///
    /// - `Configuration` if `byte_len` is zero.
    /// - `EntropyUnavailable` if the entropy source fails. No partial or
    ///   empty secret is ever returned.
    pub fn generate(&self, byte_len: usize) -> AuthResult<String> {
        if byte_len == 0 {
            return Err(AuthError::configuration("secret length must be > 0"));
        }

        let mut bytes = vec![0u8; byte_len];
        self.source
            .fill(&mut bytes)
            .map_err(|e| AuthError::entropy_unavailable(e.to_string()))?;

        Ok(URL_SAFE_NO_PAD.encode(&bytes))
    }
}

impl Default for SecretGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SecretGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretGenerator").finish_non_exhaustive()
    }
}

/// Compares two byte strings in constant time.
///
/// Execution time depends only on the lengths, never on the position of the
/// first differing byte. Inputs of different length compare unequal.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    struct FailingEntropy;

    impl EntropySource for FailingEntropy {
        fn fill(&self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::other("no entropy")))
        }
    }

    #[test]
    fn test_generate_decodes_to_requested_length() {
        let generator = SecretGenerator::new();
        for len in [1, 16, 31, 32, 33, 64, 128] {
            let secret = generator.generate(len).unwrap();
            let decoded = URL_SAFE_NO_PAD.decode(&secret).unwrap();
            assert_eq!(decoded.len(), len);
        }
    }

    #[test]
    fn test_generate_is_url_safe() {
        let secret = SecretGenerator::new().generate(64).unwrap();
        assert!(
            secret
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert!(!secret.contains('='));
    }

    #[test]
    fn test_generate_never_repeats() {
        let generator = SecretGenerator::new();
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(generator.generate(16).unwrap()));
        }
    }

    #[test]
    fn test_generate_zero_length_rejected() {
        let err = SecretGenerator::new().generate(0).unwrap_err();
        assert!(matches!(err, AuthError::Configuration { .. }));
    }

    #[test]
    fn test_entropy_failure_propagates() {
        let generator = SecretGenerator::with_source(Arc::new(FailingEntropy));
        let err = generator.generate(32).unwrap_err();
        assert!(matches!(err, AuthError::EntropyUnavailable { .. }));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }
}
