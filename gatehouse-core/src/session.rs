use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::Role;

/// Server-held session state, keyed in a [`SessionStore`](crate::SessionStore)
/// by the digest of the client-held opaque token.
///
/// The session holds a weak reference to its identity: deleting a session
/// never touches the identity, and many sessions may reference one identity.
/// The role is a copy taken at issuance; it is not refreshed when an admin
/// later mutates the identity's role (re-login picks up the new role).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token_hash: String,
    pub identity_id: Uuid,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Issue a session for an identity with the given lifetime.
    pub fn issue(token_hash: String, identity_id: Uuid, role: Role, ttl: chrono::Duration) -> Self {
        let now = Utc::now();
        Self {
            token_hash,
            identity_id,
            role,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Expiry is passive: checked at resolution time, never swept.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
