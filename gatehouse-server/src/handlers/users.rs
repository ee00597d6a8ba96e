use axum::{Extension, Json};

use gatehouse_core::Identity;

use crate::infra::errors::AppResult;

/// The caller's own profile, re-fetched by the auth middleware from the
/// credential store so it reflects the current record.
pub async fn me(Extension(user): Extension<Identity>) -> AppResult<Json<Identity>> {
    Ok(Json(user))
}
