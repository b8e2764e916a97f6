use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether the current session has been verified, is pending verification,
/// or has failed / never happened.
///
/// `Checking` is the initial value of every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub enum AuthStatus {
    #[default]
    Checking,
    Authenticated,
    NotAuthenticated,
}

impl AuthStatus {
    /// True once a check, login or logout has settled the status.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, AuthStatus::Checking)
    }

    /// Get the display name for this status.
    pub fn display_name(&self) -> &'static str {
        match self {
            AuthStatus::Checking => "checking",
            AuthStatus::Authenticated => "authenticated",
            AuthStatus::NotAuthenticated => "not authenticated",
        }
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
