//! Guard middleware composing the core predicates over a request.
//!
//! `auth_middleware` resolves the bearer token to an identity and context;
//! `admin_middleware` reads that context and checks the role. The router
//! stacks them so authentication always runs first: a request with no
//! session gets 401, never 403.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use gatehouse_core::{AuthContext, guard::require_admin};

use crate::infra::{app_state::AppState, errors::AppError};

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&request)
        .ok_or_else(|| AppError::unauthorized("Unauthorized: no valid session"))?;

    let (identity, ctx) = state.auth.resolve_session(&token).await?;

    request.extensions_mut().insert(identity);
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

/// Must be layered so `auth_middleware` runs before it; the context it reads
/// is only present once authentication has succeeded.
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, AppError> {
    let ctx = request
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| AppError::unauthorized("Unauthorized: no valid session"))?;

    require_admin(ctx)?;

    Ok(next.run(request).await)
}

pub fn extract_bearer_token(request: &Request) -> Option<String> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?;

    auth_header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_auth(value: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn bearer_extraction_requires_the_scheme_prefix() {
        assert_eq!(
            extract_bearer_token(&request_with_auth(Some("Bearer abc123"))),
            Some("abc123".to_string())
        );
        assert_eq!(extract_bearer_token(&request_with_auth(Some("abc123"))), None);
        assert_eq!(extract_bearer_token(&request_with_auth(Some("Bearer "))), None);
        assert_eq!(extract_bearer_token(&request_with_auth(None)), None);
    }
}
