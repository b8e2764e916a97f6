//! Authentication module for managing the user session and its token.
//!
//! This module provides:
//! - `SessionStore`: login / register / check-token / logout and the
//!   observable session status
//! - `SessionWatch`: a read-only subscription to that status
//! - `TokenStore`: where the bearer token is persisted (file, OS keychain,
//!   or memory)

pub mod store;
pub mod token;

pub use store::{SessionSnapshot, SessionStore, SessionWatch};
pub use token::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};
