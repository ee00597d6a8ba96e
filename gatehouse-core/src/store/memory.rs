//! In-memory store pair backing tests and database-less deployments.

use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::identity::{Identity, NewIdentity, Role};
use crate::session::Session;
use crate::store::{CredentialStore, SessionStore, StoreError, StoreResult};

/// Identity records behind a single mutex so the uniqueness check and insert
/// in `create` are one atomic step, matching what a unique index gives the
/// PostgreSQL backend.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    records: Mutex<Vec<Identity>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        let records = self.records.lock().expect("credential store poisoned");
        Ok(records
            .iter()
            .find(|r| r.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Identity>> {
        let records = self.records.lock().expect("credential store poisoned");
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn count(&self) -> StoreResult<u64> {
        let records = self.records.lock().expect("credential store poisoned");
        Ok(records.len() as u64)
    }

    async fn create(&self, new: NewIdentity) -> StoreResult<Identity> {
        let mut records = self.records.lock().expect("credential store poisoned");
        if records.iter().any(|r| r.email.eq_ignore_ascii_case(&new.email)) {
            return Err(StoreError::Conflict);
        }
        let identity = new.into_identity();
        records.push(identity.clone());
        Ok(identity)
    }

    async fn update_role(&self, id: Uuid, role: Role) -> StoreResult<Option<Identity>> {
        let mut records = self.records.lock().expect("credential store poisoned");
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        record.role = role;
        record.updated_at = chrono::Utc::now();
        Ok(Some(record.clone()))
    }

    async fn list_all(&self) -> StoreResult<Vec<Identity>> {
        let records = self.records.lock().expect("credential store poisoned");
        Ok(records.clone())
    }
}

/// Session records in a concurrent map; per-key atomicity is all the
/// contract needs.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, session: Session) -> StoreResult<()> {
        self.sessions.insert(session.token_hash.clone(), session);
        Ok(())
    }

    async fn find(&self, token_hash: &str) -> StoreResult<Option<Session>> {
        Ok(self.sessions.get(token_hash).map(|s| s.clone()))
    }

    async fn remove(&self, token_hash: &str) -> StoreResult<()> {
        self.sessions.remove(token_hash);
        Ok(())
    }
}
