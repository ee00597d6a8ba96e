//! Centralized authentication and user management service.
//!
//! Orchestrates registration, login, session resolution, and the admin-gated
//! role mutation against injected credential and session stores, so the same
//! logic runs in tests (in-memory pair) and production (PostgreSQL pair).

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::crypto::PasswordCrypto;
use crate::error::{AuthError, AuthResult};
use crate::guard::{AuthContext, require_authenticated};
use crate::identity::{Identity, NewIdentity, Role, normalize_email};
use crate::session::Session;
use crate::store::{CredentialStore, SessionStore, StoreError};

/// A freshly issued session together with the one-time plaintext token the
/// client holds from here on.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub session: Session,
}

/// Authentication and authorization core.
///
/// Registration and role mutation are serialized through `write_lock` so the
/// bootstrap count+create step and the last-admin check each observe a
/// consistent store. Duplicate emails are additionally rejected atomically by
/// the store itself, which remains the cross-process backstop.
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    crypto: PasswordCrypto,
    session_ttl: Duration,
    write_lock: Mutex<()>,
    /// Verified against when login hits an unknown email, so both rejection
    /// paths cost one Argon2 verification.
    dummy_digest: String,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService").finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        session_ttl: Duration,
    ) -> AuthResult<Self> {
        let crypto = PasswordCrypto::new();
        let dummy_digest = crypto
            .hash_password("gatehouse-login-padding")
            .map_err(|e| AuthError::Storage(anyhow::Error::new(e)))?;

        Ok(Self {
            credentials,
            sessions,
            crypto,
            session_ttl,
            write_lock: Mutex::new(()),
            dummy_digest,
        })
    }

    /// Register a new identity and issue its first session.
    ///
    /// The very first identity in an empty store becomes admin, permanently
    /// establishing the administrative root of trust. The role decision and
    /// insert run under the write lock, so two racing first registrations
    /// yield exactly one admin.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> AuthResult<(Identity, IssuedSession)> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput(
                "Email and password are required".to_string(),
            ));
        }

        // Pre-check is an optimization for a friendly error; the store's
        // uniqueness constraint is what actually decides races.
        if self.credentials.find_by_email(&email).await?.is_some() {
            return Err(AuthError::Conflict("User already exists".to_string()));
        }

        let password_hash = self
            .crypto
            .hash_password(password)
            .map_err(|e| AuthError::Storage(anyhow::Error::new(e)))?;

        let identity = {
            let _guard = self.write_lock.lock().await;

            let role = if self.credentials.count().await? == 0 {
                Role::Admin
            } else {
                Role::User
            };

            self.credentials
                .create(NewIdentity {
                    email,
                    password_hash,
                    role,
                })
                .await
                .map_err(|e| match e {
                    StoreError::Conflict => {
                        AuthError::Conflict("User already exists".to_string())
                    }
                    other => other.into(),
                })?
        };

        info!("Identity registered: {} ({})", identity.email, identity.role);

        let issued = self.issue_session(&identity).await?;
        Ok((identity, issued))
    }

    /// Verify credentials and issue a session bound to the identity's
    /// current role.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<(Identity, IssuedSession)> {
        let email = normalize_email(email);

        let Some(identity) = self.credentials.find_by_email(&email).await? else {
            self.crypto.verify_password(password, &self.dummy_digest);
            return Err(AuthError::InvalidCredentials);
        };

        if !self.crypto.verify_password(password, &identity.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.issue_session(&identity).await?;
        Ok((identity, issued))
    }

    /// Destroy the session behind a client-held token.
    ///
    /// Idempotent: an unknown or already-destroyed token is treated as
    /// already-logged-out, not an error.
    pub async fn logout(&self, token: &str) -> AuthResult<()> {
        let token_hash = PasswordCrypto::hash_session_token(token);
        self.sessions.remove(&token_hash).await?;
        Ok(())
    }

    /// Resolve a client-held token to the identity it speaks for.
    ///
    /// Fails with `Unauthorized` when the session is missing, expired, or no
    /// longer bound to a resolvable identity. The returned context carries
    /// the role cached at issuance, not the identity's current role.
    pub async fn resolve_session(&self, token: &str) -> AuthResult<(Identity, AuthContext)> {
        let token_hash = PasswordCrypto::hash_session_token(token);
        let session = self.sessions.find(&token_hash).await?;
        let ctx = require_authenticated(session, Utc::now())?;

        let identity = self
            .credentials
            .find_by_id(ctx.identity_id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        Ok((identity, ctx))
    }

    /// All identities, for an authorized admin caller.
    pub async fn list_identities(&self) -> AuthResult<Vec<Identity>> {
        Ok(self.credentials.list_all().await?)
    }

    /// Apply a role change to a target identity.
    ///
    /// Demoting the last remaining admin is rejected, so administrative
    /// access can never be locked out entirely; any other change, including
    /// an admin demoting themself, is allowed. Sessions issued before the
    /// change keep their cached role until re-login.
    pub async fn update_role(&self, target_id: Uuid, new_role: Role) -> AuthResult<Identity> {
        let _guard = self.write_lock.lock().await;

        let target = self
            .credentials
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

        if target.role.is_admin() && !new_role.is_admin() {
            let admins = self
                .credentials
                .list_all()
                .await?
                .iter()
                .filter(|i| i.role.is_admin())
                .count();
            if admins <= 1 {
                return Err(AuthError::Conflict(
                    "Cannot demote the last remaining admin".to_string(),
                ));
            }
        }

        let updated = self
            .credentials
            .update_role(target_id, new_role)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

        info!(
            "Role changed: {} ({} -> {})",
            updated.email, target.role, updated.role
        );

        Ok(updated)
    }

    async fn issue_session(&self, identity: &Identity) -> AuthResult<IssuedSession> {
        let (token, token_hash) = self.crypto.mint_session_token();
        let session = Session::issue(token_hash, identity.id, identity.role, self.session_ttl);
        self.sessions.insert(session.clone()).await?;
        Ok(IssuedSession { token, session })
    }
}
