use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sessionward_auth::{AuthError, CredentialBundle, PresentedCredentials, SessionAuth};
use time::OffsetDateTime;

use crate::error::ApiError;
use crate::metrics;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub username: String,
    pub refresh_token: String,
}

/// Issued credentials as returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub csrf_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl AuthResponse {
    fn new(message: &str, bundle: CredentialBundle) -> Self {
        Self {
            message: message.to_string(),
            access_token: bundle.access_secret,
            refresh_token: bundle.refresh_secret,
            csrf_token: bundle.anti_forgery_secret,
            expires_at: bundle.expires_at,
        }
    }
}

// Counts the outcome and passes the result through.
fn observe<T>(event: &'static str, result: Result<T, AuthError>) -> Result<T, AuthError> {
    match &result {
        Ok(_) => metrics::record_auth_event(event, "success"),
        Err(e) => metrics::record_auth_event(event, e.code()),
    }
    result
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    observe(
        "register",
        state.sessions.register(&req.username, &req.password).await,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(req) = payload?;
    let (_, bundle) = observe(
        "login",
        state.sessions.login(&req.username, &req.password).await,
    )?;

    Ok(Json(AuthResponse::new("User logged in successfully", bundle)))
}

pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(req) = payload?;
    let bundle = observe(
        "refresh",
        state
            .sessions
            .refresh(&req.username, &req.refresh_token)
            .await,
    )?;

    Ok(Json(AuthResponse::new("Tokens refreshed successfully", bundle)))
}

pub async fn logout(
    State(state): State<AppState>,
    presented: PresentedCredentials,
) -> Result<Json<Value>, ApiError> {
    observe(
        "logout",
        state
            .sessions
            .logout(&presented.access, &presented.anti_forgery)
            .await,
    )?;

    Ok(Json(json!({ "message": "User logged out successfully" })))
}

pub async fn protected(auth: Result<SessionAuth, AuthError>) -> Result<Json<Value>, ApiError> {
    let SessionAuth(user) = observe("authorize", auth)?;
    Ok(Json(json!({
        "message": format!("Protected resource accessed by user: {}", user.username)
    })))
}

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Some(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            "metrics disabled\n".to_string(),
        ),
    }
}
