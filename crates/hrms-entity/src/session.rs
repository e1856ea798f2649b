//! The locally stored session.

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Credentials and identity kept by the token store.
///
/// Exactly one session exists per console; it is overwritten on login and
/// erased on logout. A present `access_token` was valid when stored but
/// may have expired since, so callers must re-check it on use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Short-lived bearer credential.
    pub access_token: Option<String>,
    /// Long-lived credential used only for renewal.
    pub refresh_token: Option<String>,
    /// Role reported at login.
    pub role: Option<Role>,
    /// Backend user id.
    pub user_id: Option<String>,
    /// Login email.
    pub email: Option<String>,
    /// Display name.
    pub username: Option<String>,
}

impl Session {
    /// Returns `true` if both tokens are present.
    pub fn has_credentials(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }
}
