//! Session credential extractors.
//!
//! The access secret arrives in `Authorization: Bearer <secret>` or, for
//! clients that cannot set that header, in `X-Access-Token`. The
//! anti-forgery secret always arrives in `X-CSRF-Token`.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::post};
//! use sessionward_auth::middleware::{AuthState, SessionAuth};
//!
//! async fn protected(SessionAuth(user): SessionAuth) -> String {
//!     format!("Hello, {}!", user.username)
//! }
//!
//! let app = Router::new()
//!     .route("/protected", post(protected))
//!     .with_state(AuthState::new(sessions));
//! ```

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, HeaderName, header::AUTHORIZATION, request::Parts},
};

use crate::error::AuthError;
use crate::service::SessionService;
use crate::storage::User;

/// Alternate header carrying the access secret.
pub const ACCESS_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-access-token");

/// Header carrying the anti-forgery secret.
pub const CSRF_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-csrf-token");

// =============================================================================
// Auth State
// =============================================================================

/// State required by [`SessionAuth`].
///
/// Include it in the application state and expose it through `FromRef`.
#[derive(Clone)]
pub struct AuthState {
    /// Session operations backing the extractor.
    pub sessions: SessionService,
}

impl AuthState {
    /// Creates a new auth state.
    #[must_use]
    pub fn new(sessions: SessionService) -> Self {
        Self { sessions }
    }
}

// =============================================================================
// Presented Credentials
// =============================================================================

/// The raw secret pair presented by a request, not yet validated.
///
/// Absent headers yield empty strings; validation reports them as
/// `MissingCredential`.
#[derive(Clone, Default)]
pub struct PresentedCredentials {
    /// Access secret.
    pub access: String,
    /// Anti-forgery secret.
    pub anti_forgery: String,
}

impl PresentedCredentials {
    /// Reads the secret pair from request headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let access = bearer(headers)
            .or_else(|| header_str(headers, &ACCESS_TOKEN_HEADER))
            .unwrap_or_default();
        let anti_forgery = header_str(headers, &CSRF_TOKEN_HEADER).unwrap_or_default();

        Self {
            access: access.to_string(),
            anti_forgery: anti_forgery.to_string(),
        }
    }
}

impl std::fmt::Debug for PresentedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresentedCredentials")
            .field("access", &"[REDACTED]")
            .field("anti_forgery", &"[REDACTED]")
            .finish()
    }
}

impl<S> FromRequestParts<S> for PresentedCredentials
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// Session Auth Extractor
// =============================================================================

/// Axum extractor that authorizes the request and yields its user.
///
/// # Errors
///
/// Rejects with [`AuthError`] (which implements `IntoResponse`) when the
/// credentials are missing, invalid, or expired.
pub struct SessionAuth(pub User);

impl<S> FromRequestParts<S> for SessionAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let presented = PresentedCredentials::from_headers(&parts.headers);

        let user = auth_state
            .sessions
            .authorize(&presented.access, &presented.anti_forgery)
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "Request not authorized"))?;

        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;

    use super::*;
    use crate::config::{PasswordConfig, TokenConfig};
    use crate::storage::{InMemoryBundleStore, InMemoryUserStore};

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/protected");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn state() -> AuthState {
        let config = TokenConfig {
            password: PasswordConfig {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
            ..Default::default()
        };
        AuthState::new(SessionService::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryBundleStore::new()),
            config,
        ))
    }

    #[test]
    fn test_bearer_preferred_over_alternate_header() {
        let parts = parts(&[
            ("Authorization", "Bearer from-bearer"),
            ("X-Access-Token", "from-header"),
            ("X-CSRF-Token", "csrf"),
        ]);
        let presented = PresentedCredentials::from_headers(&parts.headers);
        assert_eq!(presented.access, "from-bearer");
        assert_eq!(presented.anti_forgery, "csrf");
    }

    #[test]
    fn test_alternate_header_and_missing() {
        let header_parts = parts(&[("X-Access-Token", "from-header")]);
        let presented = PresentedCredentials::from_headers(&header_parts.headers);
        assert_eq!(presented.access, "from-header");
        assert!(presented.anti_forgery.is_empty());

        let empty_parts = parts(&[]);
        let presented = PresentedCredentials::from_headers(&empty_parts.headers);
        assert!(presented.access.is_empty());
    }

    #[test]
    fn test_non_bearer_scheme_ignored() {
        let parts = parts(&[("Authorization", "Basic dXNlcjpwYXNz")]);
        let presented = PresentedCredentials::from_headers(&parts.headers);
        assert!(presented.access.is_empty());
    }

    #[test]
    fn test_debug_redacts() {
        let presented = PresentedCredentials {
            access: "visible-access".to_string(),
            anti_forgery: "visible-csrf".to_string(),
        };
        let rendered = format!("{presented:?}");
        assert!(!rendered.contains("visible"));
    }

    #[tokio::test]
    async fn test_extractor_authorizes() {
        let state = state();
        state
            .sessions
            .register("alice-smith", "password123")
            .await
            .unwrap();
        let (_, bundle) = state
            .sessions
            .login("alice-smith", "password123")
            .await
            .unwrap();

        let mut ok = parts(&[
            ("X-Access-Token", bundle.access_secret.as_str()),
            ("X-CSRF-Token", bundle.anti_forgery_secret.as_str()),
        ]);
        let SessionAuth(user) = SessionAuth::from_request_parts(&mut ok, &state)
            .await
            .unwrap();
        assert_eq!(user.username, "alice-smith");

        let mut no_csrf = parts(&[("X-Access-Token", bundle.access_secret.as_str())]);
        let err = SessionAuth::from_request_parts(&mut no_csrf, &state)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AuthError::MissingCredential));
    }
}
