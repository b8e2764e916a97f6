//! The session store: single source of truth for who is logged in.
//!
//! State lives in one `watch` cell holding a [`SessionSnapshot`]. Every
//! operation that changes the session publishes a whole snapshot, and
//! consumers read it through [`SessionStore`] accessors or a read-only
//! [`SessionWatch`].

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{ApiError, AuthClient};
use crate::models::{AuthStatus, RegisterResponse, User};

use super::token::{TokenStore, TOKEN_KEY};

/// Status and user, published together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub status: AuthStatus,
    pub user: Option<User>,
}

impl SessionSnapshot {
    fn authenticated(user: User) -> Self {
        Self {
            status: AuthStatus::Authenticated,
            user: Some(user),
        }
    }

    fn not_authenticated() -> Self {
        Self {
            status: AuthStatus::NotAuthenticated,
            user: None,
        }
    }
}

struct Inner {
    api: AuthClient,
    tokens: Arc<dyn TokenStore>,
    state: watch::Sender<SessionSnapshot>,
}

/// Session state service. Clone is cheap and every clone shares one session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Create a store in the `Checking` state. Call [`SessionStore::start`]
    /// (or [`SessionStore::check_auth_status`]) to resolve it.
    pub fn new(api: AuthClient, tokens: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            inner: Arc::new(Inner { api, tokens, state }),
        }
    }

    /// Spawn the startup token check on the current runtime
    pub fn start(&self) -> JoinHandle<bool> {
        let store = self.clone();
        tokio::spawn(async move { store.check_auth_status().await })
    }

    // ===== Read-only views =====

    pub fn status(&self) -> AuthStatus {
        self.inner.state.borrow().status
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.state.borrow().user.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == AuthStatus::Authenticated
    }

    /// Subscribe to session changes
    pub fn subscribe(&self) -> SessionWatch {
        SessionWatch {
            rx: self.inner.state.subscribe(),
        }
    }

    // ===== Operations =====

    /// Log in with email and password.
    ///
    /// On success the returned user and token become the session. On failure
    /// the session is left exactly as it was and the error is returned; use
    /// [`ApiError::message`] for the text to show the user.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        match self.inner.api.login(email, password).await {
            Ok(response) => {
                info!(user_id = %response.user.id, "Login successful");
                self.set_authentication(response.user, &response.token);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                Err(e)
            }
        }
    }

    /// Register a new account.
    ///
    /// Does not log in: the session is untouched whatever the outcome.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse, ApiError> {
        match self.inner.api.register(name, email, password).await {
            Ok(response) => {
                info!("Registration accepted");
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                Err(e)
            }
        }
    }

    /// Verify the stored token with the backend.
    ///
    /// Never fails: any problem resolves the session to `NotAuthenticated`
    /// and returns `false`. Without a stored token no request is made. A
    /// token the backend explicitly rejects (401/403) is removed; one that
    /// could not be checked (network, 5xx, bad body) is kept for next time.
    pub async fn check_auth_status(&self) -> bool {
        let token = match self.inner.tokens.get(TOKEN_KEY) {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No stored token");
                self.logout();
                return false;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored token");
                self.publish(SessionSnapshot::not_authenticated());
                return false;
            }
        };

        match self.inner.api.check_token(&token).await {
            Ok(response) => {
                debug!(user_id = %response.user.id, "Stored token accepted");
                self.set_authentication(response.user, &response.token)
            }
            Err(e) => {
                if e.is_credential_rejection() {
                    info!(error = %e, "Stored token rejected, discarding it");
                    self.remove_token();
                } else {
                    warn!(error = %e, "Token check failed, keeping stored token");
                }
                self.publish(SessionSnapshot::not_authenticated());
                false
            }
        }
    }

    /// Drop the session locally. No request is made and this never fails.
    pub fn logout(&self) {
        self.remove_token();
        self.publish(SessionSnapshot::not_authenticated());
        debug!("Session cleared");
    }

    // ===== Internals =====

    fn set_authentication(&self, user: User, token: &str) -> bool {
        if let Err(e) = self.inner.tokens.set(TOKEN_KEY, token) {
            warn!(error = %e, "Failed to persist token");
        }
        self.publish(SessionSnapshot::authenticated(user));
        true
    }

    fn remove_token(&self) {
        if let Err(e) = self.inner.tokens.remove(TOKEN_KEY) {
            warn!(error = %e, "Failed to remove stored token");
        }
    }

    /// Replace the snapshot, waking subscribers only if it differs.
    fn publish(&self, next: SessionSnapshot) {
        let changed = self.inner.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            debug!(status = ?self.status(), "Session status published");
        }
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("base_url", &self.inner.api.base_url())
            .field("snapshot", &*self.inner.state.borrow())
            .finish()
    }
}

/// Read-only subscription to a [`SessionStore`].
#[derive(Debug, Clone)]
pub struct SessionWatch {
    rx: watch::Receiver<SessionSnapshot>,
}

impl SessionWatch {
    pub fn status(&self) -> AuthStatus {
        self.rx.borrow().status
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.rx.borrow().clone()
    }

    /// True if a snapshot was published since this watch last looked
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next published snapshot.
    /// Returns `None` once every clone of the store is gone.
    pub async fn changed(&mut self) -> Option<SessionSnapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until the status is no longer `Checking`
    pub async fn wait_until_resolved(&mut self) -> AuthStatus {
        let resolved = self
            .rx
            .wait_for(|snapshot| snapshot.status.is_resolved())
            .await
            .map(|snapshot| snapshot.status);
        resolved.unwrap_or_else(|_| self.rx.borrow().status)
    }
}
