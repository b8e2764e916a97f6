//! Route guard consulted before entering protected views.
//!
//! The guard keeps no state. Each call reads the session status afresh
//! and either lets the navigation through, blocks it while the session is
//! still being checked, or blocks it and asks the [`Navigator`] to send
//! the user to the login route.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::auth::SessionStore;
use crate::models::AuthStatus;

/// Route the guard redirects to by default
pub const DEFAULT_LOGIN_ROUTE: &str = "/auth/login";

/// A programmatic redirect request for the navigation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
    /// The route the user was trying to enter
    pub return_to: Option<String>,
}

/// The navigation layer's redirect hook.
pub trait Navigator: Send + Sync {
    fn navigate(&self, redirect: &Redirect);
}

/// Outcome of evaluating a protected route against a session status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// Session still being checked: deny without redirecting
    Pending,
    Redirect(Redirect),
}

impl Access {
    pub fn decide(status: AuthStatus, route: &str, login_route: &str) -> Self {
        match status {
            AuthStatus::Authenticated => Access::Allow,
            AuthStatus::Checking => Access::Pending,
            AuthStatus::NotAuthenticated => Access::Redirect(Redirect {
                to: login_route.to_string(),
                return_to: Some(route.to_string()),
            }),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allow)
    }
}

#[derive(Clone)]
pub struct RouteGuard {
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    login_route: String,
}

impl RouteGuard {
    pub fn new(session: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            session,
            navigator,
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
        }
    }

    pub fn with_login_route(mut self, login_route: impl Into<String>) -> Self {
        self.login_route = login_route.into();
        self
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    /// Evaluate `route` against the current status without side effects
    pub fn access(&self, route: &str) -> Access {
        Access::decide(self.session.status(), route, &self.login_route)
    }

    /// Whether navigation to `route` may proceed.
    ///
    /// Redirects to the login route when the session is not authenticated.
    /// While the session is still `Checking` this returns `false` and does
    /// not redirect; callers that want to wait should use
    /// [`RouteGuard::can_activate_when_resolved`].
    pub fn can_activate(&self, route: &str) -> bool {
        match self.access(route) {
            Access::Allow => true,
            Access::Pending => {
                debug!(route, "Session check pending, blocking navigation");
                false
            }
            Access::Redirect(redirect) => {
                info!(route, to = %redirect.to, "Not authenticated, redirecting");
                self.navigator.navigate(&redirect);
                false
            }
        }
    }

    /// Wait for the session check to settle, then apply [`RouteGuard::can_activate`]
    pub async fn can_activate_when_resolved(&self, route: &str) -> bool {
        self.session.subscribe().wait_until_resolved().await;
        self.can_activate(route)
    }
}

impl fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteGuard")
            .field("login_route", &self.login_route)
            .field("status", &self.session.status())
            .finish()
    }
}
