//! The access guard chain: two explicit predicates composed in a fixed
//! order by the HTTP layer.
//!
//! `require_authenticated` runs first for every protected operation; only
//! after it succeeds may `require_admin` run. A request with no session is
//! always told "unauthorized", never "forbidden".

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::identity::Role;
use crate::session::Session;

/// The identity a resolved session speaks for, as seen by guards and
/// handlers. The role is the session's cached copy from issuance.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity_id: Uuid,
    pub role: Role,
    pub token_hash: String,
}

/// Authenticated check: a session must be present and alive.
///
/// No session, or an expired one, fails with `Unauthorized` before the
/// operation is reached.
pub fn require_authenticated(
    session: Option<Session>,
    now: DateTime<Utc>,
) -> AuthResult<AuthContext> {
    let session = session.ok_or(AuthError::Unauthorized)?;
    if session.is_expired(now) {
        return Err(AuthError::Unauthorized);
    }
    Ok(AuthContext {
        identity_id: session.identity_id,
        role: session.role,
        token_hash: session.token_hash,
    })
}

/// Authorized (admin) check: only meaningful after `require_authenticated`.
pub fn require_admin(ctx: &AuthContext) -> AuthResult<()> {
    if ctx.role.is_admin() {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(role: Role, ttl: Duration) -> Session {
        Session::issue("digest".into(), Uuid::now_v7(), role, ttl)
    }

    #[test]
    fn missing_session_is_unauthorized() {
        let err = require_authenticated(None, Utc::now()).unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[test]
    fn expired_session_is_unauthorized() {
        let err = require_authenticated(
            Some(session(Role::Admin, Duration::hours(-1))),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[test]
    fn non_admin_context_is_forbidden() {
        let ctx = require_authenticated(Some(session(Role::User, Duration::hours(1))), Utc::now())
            .unwrap();
        assert!(matches!(require_admin(&ctx), Err(AuthError::Forbidden)));
    }

    #[test]
    fn admin_context_passes_both_predicates() {
        let ctx = require_authenticated(Some(session(Role::Admin, Duration::hours(1))), Utc::now())
            .unwrap();
        assert!(require_admin(&ctx).is_ok());
    }

    #[test]
    fn missing_session_never_reaches_the_admin_check() {
        // Composing the predicates in order means an unauthenticated request
        // short-circuits as Unauthorized even for an admin-gated operation.
        let outcome = require_authenticated(None, Utc::now()).and_then(|ctx| {
            require_admin(&ctx)?;
            Ok(ctx)
        });
        assert!(matches!(outcome, Err(AuthError::Unauthorized)));
    }
}
