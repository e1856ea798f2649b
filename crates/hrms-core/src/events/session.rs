//! Session lifecycle events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Events related to the local session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// Credentials were accepted and a session was stored.
    LoggedIn {
        /// The user ID reported by the backend.
        user_id: Option<String>,
        /// The email reported by the backend.
        email: Option<String>,
    },
    /// The access token was replaced by a renewal.
    TokenRenewed,
    /// The session was erased; the UI should navigate to `redirect_to`.
    LoggedOut {
        /// Why the session ended.
        reason: LogoutReason,
        /// Route the UI should navigate to.
        redirect_to: String,
    },
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutReason {
    /// The user asked to log out.
    UserRequested,
    /// Access or refresh token was missing when a renewal was needed.
    MissingCredentials,
    /// The backend refused to renew the access token.
    RenewalFailed,
    /// Too many consecutive 401 responses.
    RetryBudgetExhausted,
    /// The route guard found an expired token.
    TokenExpired,
}

impl fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UserRequested => "user_requested",
            Self::MissingCredentials => "missing_credentials",
            Self::RenewalFailed => "renewal_failed",
            Self::RetryBudgetExhausted => "retry_budget_exhausted",
            Self::TokenExpired => "token_expired",
        };
        f.write_str(s)
    }
}
