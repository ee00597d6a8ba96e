//! # Gatehouse Server
//!
//! HTTP surface for the Gatehouse authentication service.
//!
//! ## Overview
//!
//! The server wires the [`gatehouse_core`] auth core to an axum router:
//!
//! - **Public endpoints**: register, login, logout
//! - **Session-gated endpoints**: the caller's own profile
//! - **Admin-gated endpoints**: user listing and role mutation, behind the
//!   authenticated-then-authorized middleware pair
//!
//! ## Architecture
//!
//! The server is built on Axum and uses PostgreSQL for persistent storage
//! when `DATABASE_URL` is set, or the in-memory store pair otherwise.

pub mod handlers;
pub mod infra;
pub mod middleware;
pub mod routes;

#[cfg(test)]
mod tests;

pub use infra::app_state::AppState;
pub use infra::config::Config;
