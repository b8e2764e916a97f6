//! REST client module for the authentication backend.
//!
//! This module provides the `AuthClient` for the three auth endpoints
//! (`/login`, `/register`, `/check-token`) and the `ApiError` taxonomy
//! every failed call is mapped into.
//!
//! The check-token endpoint uses bearer token authentication with the
//! token handed out by login.

pub mod client;
pub mod error;

pub use client::AuthClient;
pub use error::ApiError;
