//! gatepass core - client-side session management for an auth backend.
//!
//! - [`SessionStore`]: login, register, check-token and logout against the
//!   backend, with the session status published to every subscriber
//! - [`RouteGuard`]: decides whether a protected route may be entered
//! - [`Config`]: backend URL, login route, timeout and token storage

pub mod api;
pub mod auth;
pub mod config;
pub mod guard;
pub mod models;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{ApiError, AuthClient};
pub use auth::{SessionSnapshot, SessionStore, SessionWatch, TokenStore};
pub use config::{Config, TokenBackend};
pub use guard::{Access, Navigator, Redirect, RouteGuard};
pub use models::{AuthStatus, User};
