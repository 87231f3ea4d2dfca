use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sessionward_auth::AuthError;
use serde_json::json;

/// Errors returned by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl ApiError {
    /// Machine-readable code, as sent in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Auth(e) => e.code(),
            Self::InvalidBody(_) => "invalid_request",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(e) => e.into_response(),
            Self::InvalidBody(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": format!("Invalid request body: {message}"),
                    "code": "invalid_request",
                })),
            )
                .into_response(),
        }
    }
}
