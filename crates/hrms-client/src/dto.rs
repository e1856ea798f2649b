//! Request and response bodies of the auth endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use hrms_entity::{EntityId, Role, Session};

/// Credentials for either login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login email.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Plain-text password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Successful login body.
///
/// Field names vary between the two login endpoints, hence the aliases.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Access token.
    #[serde(alias = "accessToken", alias = "access_token")]
    pub token: Option<String>,
    /// Refresh token.
    #[serde(alias = "refresh_token")]
    pub refresh_token: Option<String>,
    /// Role as a code or a name.
    #[serde(default)]
    pub role: Option<Value>,
    /// Backend user id.
    #[serde(alias = "user_id", alias = "id")]
    pub user_id: Option<EntityId>,
    /// Login email.
    pub email: Option<String>,
    /// Display name.
    #[serde(alias = "name")]
    pub username: Option<String>,
}

impl LoginResponse {
    /// The session to store. The login email fills in a missing `email`.
    pub fn into_session(self, login_email: &str) -> Session {
        Session {
            access_token: self.token,
            refresh_token: self.refresh_token,
            role: self.role.as_ref().and_then(Role::from_claim),
            user_id: self.user_id.map(|id| id.0),
            email: self.email.or_else(|| Some(login_email.to_string())),
            username: self.username,
        }
    }
}

/// Body of the renewal call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewRequest<'a> {
    /// The long-lived credential.
    pub refresh_token: &'a str,
}

/// Response of the renewal call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewResponse {
    /// The new access token.
    #[serde(alias = "token", alias = "access_token")]
    pub access_token: Option<String>,
}

/// Creates a super admin or admin account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminRegistration {
    /// Full name.
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    /// Login email.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Initial password.
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    /// Role code of the new account.
    pub role: Role,
    /// Contact phone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Starts the password reset flow.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ForgotPasswordRequest {
    /// Account email.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Completes the password reset flow.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    /// Token from the reset email.
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,
    /// The new password.
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}
