//! # Gatehouse Core
//!
//! Core library for the Gatehouse authentication service, providing credential
//! verification, session lifecycle management, and role-based access control.
//!
//! ## Overview
//!
//! `gatehouse-core` is the domain layer of the Gatehouse service, offering:
//!
//! - **Identity Management**: Email/password accounts with a two-role RBAC model
//! - **Session Lifecycle**: Opaque bearer tokens resolved server-side, with
//!   passive time-based expiry
//! - **Bootstrap Policy**: The first registered identity becomes the admin
//!   root of trust, with no separate provisioning step
//! - **Storage Abstraction**: Trait-based credential and session stores with
//!   in-memory and PostgreSQL backends
//!
//! ## Architecture
//!
//! The crate is organized into a handful of focused modules:
//!
//! - [`identity`]: [`Identity`] and [`Role`] domain types
//! - [`session`]: server-held [`Session`] records and issued-token pairing
//! - [`crypto`]: Argon2id password hashing and session token minting
//! - [`store`]: [`CredentialStore`] and [`SessionStore`] traits plus backends
//! - [`service`]: [`AuthService`] orchestrating registration, login, and the
//!   admin-gated role mutation
//! - [`guard`]: the authenticated/authorized predicate pair composed by the
//!   HTTP layer

pub mod crypto;
pub mod error;
pub mod guard;
pub mod identity;
pub mod service;
pub mod session;
pub mod store;

pub use crypto::PasswordCrypto;
pub use error::{AuthError, AuthResult};
pub use guard::AuthContext;
pub use identity::{Identity, NewIdentity, Role};
pub use service::{AuthService, IssuedSession};
pub use session::Session;
pub use store::{CredentialStore, SessionStore, StoreError};
