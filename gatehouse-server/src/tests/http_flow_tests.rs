//! Router-level tests covering the HTTP contract: status codes, guard
//! ordering, and response shapes, driven against the in-memory store pair.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use gatehouse_core::{
    AuthService,
    store::memory::{InMemoryCredentialStore, InMemorySessionStore},
};

use crate::{infra::app_state::AppState, infra::config::Config, routes::create_router};

fn test_app() -> Router {
    let auth = Arc::new(
        AuthService::new(
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(InMemorySessionStore::new()),
            chrono::Duration::hours(1),
        )
        .unwrap(),
    );
    let config = Config {
        server_host: "127.0.0.1".into(),
        server_port: 0,
        database_url: None,
        session_ttl_hours: 1,
        cors_allowed_origins: vec![],
    };
    create_router(AppState::new(auth, config))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn authed_request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let body = match body {
        Some(value) => Body::from(serde_json::to_vec(&value).unwrap()),
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/register",
            json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn register_bootstraps_admin_and_hides_the_hash() {
    let app = test_app();

    let (status, body) = register(&app, "root@example.com", "pw").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["session_token"].as_str().is_some());

    let (status, body) = register(&app, "second@example.com", "pw").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "user");
}

#[tokio::test]
async fn register_rejects_empty_input_and_duplicates() {
    let app = test_app();

    let (status, _) = register(&app, "", "pw").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = register(&app, "a@b.com", "pw").await;
    assert_eq!(status, StatusCode::CREATED);

    // Same email modulo trim + case folding.
    let (status, body) = register(&app, " A@B.com ", "other").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], "User already exists");
}

#[tokio::test]
async fn login_failures_are_401_and_indistinguishable() {
    let app = test_app();
    register(&app, "a@b.com", "right").await;

    let wrong = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            json!({ "email": "a@b.com", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong_body = body_json(wrong).await;

    let unknown = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            json!({ "email": "nobody@b.com", "password": "right" }),
        ))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown_body = body_json(unknown).await;

    assert_eq!(wrong_body["error"]["message"], unknown_body["error"]["message"]);
}

#[tokio::test]
async fn me_reflects_the_session_holder() {
    let app = test_app();
    let (_, registered) = register(&app, "a@b.com", "pw").await;
    let token = registered["session_token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/v1/users/me", token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["email"], "a@b.com");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn protected_routes_without_a_session_are_unauthorized() {
    let app = test_app();

    let me = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);

    // Admin-gated operation with no session: 401, never 403.
    let admin = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/admin/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(admin.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_admin_sessions_are_forbidden_from_admin_routes() {
    let app = test_app();
    register(&app, "root@example.com", "pw").await;
    let (_, user) = register(&app, "user@example.com", "pw").await;
    let token = user["session_token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/v1/admin/users", token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_can_list_users_and_mutate_roles() {
    let app = test_app();
    let (_, admin) = register(&app, "root@example.com", "pw").await;
    let (_, user) = register(&app, "user@example.com", "pw").await;
    let admin_token = admin["session_token"].as_str().unwrap();
    let user_id = user["user"]["id"].as_str().unwrap().to_string();

    let list = app
        .clone()
        .oneshot(authed_request("GET", "/api/v1/admin/users", admin_token, None))
        .await
        .unwrap();
    assert_eq!(list.status(), StatusCode::OK);
    let listed = body_json(list).await;
    assert_eq!(listed.as_array().unwrap().len(), 2);

    let promote = app
        .clone()
        .oneshot(authed_request(
            "PATCH",
            &format!("/api/v1/admin/users/{user_id}/role"),
            admin_token,
            Some(json!({ "role": "admin" })),
        ))
        .await
        .unwrap();
    assert_eq!(promote.status(), StatusCode::OK);
    assert_eq!(body_json(promote).await["role"], "admin");
}

#[tokio::test]
async fn role_mutation_error_paths() {
    let app = test_app();
    let (_, admin) = register(&app, "root@example.com", "pw").await;
    let admin_token = admin["session_token"].as_str().unwrap();
    let admin_id = admin["user"]["id"].as_str().unwrap().to_string();

    // Role outside {admin, user}.
    let bad_role = app
        .clone()
        .oneshot(authed_request(
            "PATCH",
            &format!("/api/v1/admin/users/{admin_id}/role"),
            admin_token,
            Some(json!({ "role": "superuser" })),
        ))
        .await
        .unwrap();
    assert_eq!(bad_role.status(), StatusCode::BAD_REQUEST);

    // Nonexistent target.
    let missing = app
        .clone()
        .oneshot(authed_request(
            "PATCH",
            &format!("/api/v1/admin/users/{}/role", uuid::Uuid::now_v7()),
            admin_token,
            Some(json!({ "role": "user" })),
        ))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    // Demoting the only admin would lock administration out entirely.
    let lockout = app
        .clone()
        .oneshot(authed_request(
            "PATCH",
            &format!("/api/v1/admin/users/{admin_id}/role"),
            admin_token,
            Some(json!({ "role": "user" })),
        ))
        .await
        .unwrap();
    assert_eq!(lockout.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn logout_invalidates_the_session_and_stays_idempotent() {
    let app = test_app();
    let (_, registered) = register(&app, "a@b.com", "pw").await;
    let token = registered["session_token"].as_str().unwrap();

    let first = app
        .clone()
        .oneshot(authed_request("POST", "/api/v1/auth/logout", token, None))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let me = app
        .clone()
        .oneshot(authed_request("GET", "/api/v1/users/me", token, None))
        .await
        .unwrap();
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);

    // Logging out again with the now-invalid token still succeeds.
    let second = app
        .clone()
        .oneshot(authed_request("POST", "/api/v1/auth/logout", token, None))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);

    // As does logging out with no token at all.
    let bare = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/auth/logout", json!({})))
        .await
        .unwrap();
    assert_eq!(bare.status(), StatusCode::OK);
}
