use axum::{Json, extract::Request, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use gatehouse_core::Identity;

use crate::infra::{app_state::AppState, errors::AppResult};
use crate::middleware::extract_bearer_token;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Issued-session response: the identity plus the one-time plaintext token
/// the client presents as a bearer credential from here on.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: Identity,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let (user, issued) = state.auth.register(&request.email, &request.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user,
            session_token: issued.token,
            expires_at: issued.session.expires_at,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (user, issued) = state.auth.login(&request.email, &request.password).await?;

    Ok(Json(AuthResponse {
        user,
        session_token: issued.token,
        expires_at: issued.session.expires_at,
    }))
}

/// Destroy the caller's session. Deliberately unguarded: logging out with a
/// missing, unknown, or already-destroyed token is already-logged-out, not
/// an error.
pub async fn logout(
    State(state): State<AppState>,
    request: Request,
) -> AppResult<Json<Value>> {
    if let Some(token) = extract_bearer_token(&request) {
        state.auth.logout(&token).await?;
    }

    Ok(Json(json!({ "message": "Logged out successfully" })))
}
