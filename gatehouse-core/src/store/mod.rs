//! Storage abstractions consumed by the auth service and guards.
//!
//! The core never talks to a concrete backend directly; it depends on these
//! traits so the same service logic runs against the in-memory pair in tests
//! and the PostgreSQL pair in production.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::identity::{Identity, NewIdentity, Role};
use crate::session::Session;

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryCredentialStore, InMemorySessionStore};
pub use postgres::{PostgresCredentialStore, PostgresSessionStore};

/// Failures a store can surface. Uniqueness violations are distinguishable
/// because the service maps them to the caller-facing `Conflict`; everything
/// else is an opaque backend failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("uniqueness constraint violated")]
    Conflict,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for identity records.
///
/// `create` must enforce email uniqueness atomically (unique index,
/// single-lock insert); the service's pre-check is an optimization and is
/// not relied upon under concurrency.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact match on a normalized (trimmed, lowercased) email.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Identity>>;

    /// Total identity count, used only for the bootstrap role decision.
    async fn count(&self) -> StoreResult<u64>;

    /// Insert a new identity; `StoreError::Conflict` if the email exists.
    async fn create(&self, new: NewIdentity) -> StoreResult<Identity>;

    /// Apply a role change, returning the updated record, or `None` if the
    /// id does not exist.
    async fn update_role(&self, id: Uuid, role: Role) -> StoreResult<Option<Identity>>;

    /// All identities, insertion-ordered. No pagination in scope.
    async fn list_all(&self) -> StoreResult<Vec<Identity>>;
}

/// Persistence for session records, keyed by token digest.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: Session) -> StoreResult<()>;

    async fn find(&self, token_hash: &str) -> StoreResult<Option<Session>>;

    /// Remove a session. Removing an unknown or already-removed digest is
    /// not an error.
    async fn remove(&self, token_hash: &str) -> StoreResult<()>;
}
