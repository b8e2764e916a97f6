//! Data models for the authentication backend.
//!
//! - `User`: the profile record returned by login and check-token
//! - `AuthStatus`: the three-valued session status
//! - `AuthResponse`, `RegisterResponse`: endpoint payloads

pub mod status;
pub mod user;

pub use status::AuthStatus;
pub use user::{AuthResponse, CheckTokenResponse, LoginResponse, RegisterResponse, User};
