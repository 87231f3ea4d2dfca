//! Axum integration.
//!
//! - [`SessionAuth`] authorizes a request and yields its user
//! - [`PresentedCredentials`] reads the raw secret pair without validating it
//! - `IntoResponse` for [`AuthError`](crate::error::AuthError) renders JSON
//!   error bodies with `WWW-Authenticate` on 401

pub mod auth;
pub mod error;

pub use auth::{
    ACCESS_TOKEN_HEADER, AuthState, CSRF_TOKEN_HEADER, PresentedCredentials, SessionAuth,
};
pub use error::status_code;
