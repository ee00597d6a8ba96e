use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::{
    handlers::{admin, auth, users},
    infra::app_state::AppState,
    middleware::{admin_middleware, auth_middleware},
};

/// Build the full application router.
///
/// Admin routes carry both guard layers; axum runs the outermost layer
/// first, so authentication always precedes the role check.
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Unguarded so logout of an already-dead session stays idempotent
        .route("/auth/logout", post(auth::logout));

    let protected = Router::new()
        .route("/users/me", get(users::me))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let admin_routes = Router::new()
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}/role", patch(admin::update_user_role))
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api/v1", public.merge(protected).merge(admin_routes))
        .with_state(state)
}
