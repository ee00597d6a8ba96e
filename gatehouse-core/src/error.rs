use thiserror::Error;

use crate::store::StoreError;

/// Failure taxonomy surfaced to callers of the auth core.
///
/// Every variant maps to a stable, caller-safe message; storage failures are
/// carried separately so internals never leak through the API boundary.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    /// Login failure. Deliberately identical for "no such user" and "wrong
    /// password" so callers cannot enumerate registered emails.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: no valid session")]
    Unauthorized,

    #[error("Forbidden: admin access required")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(anyhow::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => AuthError::Conflict("User already exists".to_string()),
            StoreError::Backend(e) => AuthError::Storage(e),
        }
    }
}
