//! Error response handling for the session extractors.
//!
//! Every [`AuthError`] renders as `{"error": ..., "code": ...}`. Server-side
//! failures are logged in full but answered with a generic message.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AuthError;

/// Realm advertised in `WWW-Authenticate`.
const REALM: &str = "sessionward";

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = status_code(&self);

        if self.is_server_error() {
            tracing::error!(error = %self, category = %self.category(), "Request failed");
        }

        let body = json!({
            "error": public_message(&self),
            "code": self.code(),
        });
        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            if let Ok(value) = HeaderValue::from_str(&www_authenticate(&self)) {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, value);
            }
        }

        response
    }
}

/// Maps an error to its HTTP status.
#[must_use]
pub fn status_code(error: &AuthError) -> StatusCode {
    match error {
        AuthError::MissingCredential
        | AuthError::InvalidCredential
        | AuthError::CredentialExpired => StatusCode::UNAUTHORIZED,
        AuthError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        AuthError::UserExists { .. } => StatusCode::CONFLICT,
        AuthError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AuthError::GenerationFailed { .. }
        | AuthError::EntropyUnavailable { .. }
        | AuthError::Configuration { .. }
        | AuthError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn public_message(error: &AuthError) -> String {
    match error {
        AuthError::StoreUnavailable { .. } => "Service temporarily unavailable".to_string(),
        e if e.is_server_error() => "Internal server error".to_string(),
        e => e.to_string(),
    }
}

/// Builds the `WWW-Authenticate` value for 401 responses.
///
/// A missing credential carries no error code (RFC 6750 §3.1).
fn www_authenticate(error: &AuthError) -> String {
    match error {
        AuthError::MissingCredential => format!("Bearer realm=\"{REALM}\""),
        AuthError::CredentialExpired => format!(
            "Bearer realm=\"{REALM}\", error=\"invalid_token\", error_description=\"The access token expired\""
        ),
        _ => format!("Bearer realm=\"{REALM}\", error=\"invalid_token\""),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_code(&AuthError::MissingCredential),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_code(&AuthError::CredentialExpired),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_code(&AuthError::invalid_request("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_code(&AuthError::user_exists("x")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_code(&AuthError::store_unavailable("x")),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_code(&AuthError::entropy_unavailable("x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_unauthorized_has_www_authenticate() {
        let response = AuthError::CredentialExpired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let challenge = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(challenge.contains("invalid_token"));

        let body = body_json(response).await;
        assert_eq!(body["code"], "credential_expired");
        assert_eq!(body["error"], "Credential expired");
    }

    #[tokio::test]
    async fn test_server_error_message_is_generic() {
        let response = AuthError::internal("connection string leaked").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());

        let body = body_json(response).await;
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["code"], "server_error");
    }
}
