//! Admin-gated user management endpoints. Both sit behind the
//! authenticated-then-authorized middleware pair; by the time a handler runs
//! the caller is a session-holding admin.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use uuid::Uuid;

use gatehouse_core::{AuthContext, Identity, Role};

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub role: String,
}

/// All identities, unpaginated.
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<Identity>>> {
    let users = state.auth.list_identities().await?;
    Ok(Json(users))
}

pub async fn update_user_role(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(admin): Extension<AuthContext>,
    Json(request): Json<UpdateRoleRequest>,
) -> AppResult<Json<Identity>> {
    let role: Role = request
        .role
        .parse()
        .map_err(|_| AppError::bad_request("Role must be one of: admin, user"))?;

    let updated = state.auth.update_role(user_id, role).await?;

    tracing::info!(
        "Role of {} set to {} by {}",
        updated.email,
        updated.role,
        admin.identity_id
    );

    Ok(Json(updated))
}
