//! Auth endpoints and the renewal call used by the session manager.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};
use tracing::{info, warn};
use validator::Validate;

use hrms_auth::TokenRenewer;
use hrms_core::events::LogoutReason;
use hrms_core::result::AppResult;
use hrms_entity::Session;

use crate::dto::{
    AdminRegistration, ForgotPasswordRequest, LoginRequest, LoginResponse, RenewRequest,
    RenewResponse, ResetPasswordRequest,
};
use crate::http::{ApiClient, decode_body, error_from_response, message_of, read_body, transport_error};

/// Admin login.
pub const ADMIN_LOGIN: &str = "/api/admin-login";
/// Onboarding manager login.
pub const ONBOARDING_LOGIN: &str = "/api/onboarding-manager/login";
/// Server-side logout.
pub const ADMIN_LOGOUT: &str = "/api/admin-logout";
/// Token renewal.
pub const RENEW_TOKEN: &str = "/api/renew-token";
/// Admin account creation.
pub const ADMIN_REGISTRATION: &str = "/api/admin-registration/create";
/// Password reset request.
pub const FORGOT_PASSWORD: &str = "/api/forgot-password";
/// Password reset completion.
pub const RESET_PASSWORD: &str = "/api/reset-password";

/// Calls the renewal endpoint directly, bypassing [`ApiClient`] so a
/// renewal can never trigger another renewal.
#[derive(Debug, Clone)]
pub struct HttpTokenRenewer {
    http: reqwest::Client,
    url: String,
}

impl HttpTokenRenewer {
    /// Creates a renewer posting to `{base_url}/api/renew-token`.
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            url: format!("{}{}", base_url.trim_end_matches('/'), RENEW_TOKEN),
        }
    }
}

#[async_trait]
impl TokenRenewer for HttpTokenRenewer {
    async fn renew(&self, access_token: &str, refresh_token: &str) -> AppResult<Option<String>> {
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(access_token)
            .json(&RenewRequest { refresh_token })
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() != StatusCode::OK {
            return Err(error_from_response(response).await);
        }
        let body: RenewResponse = decode_body(read_body(response).await?)?;
        Ok(body.access_token.filter(|t| !t.is_empty()))
    }
}

/// Login, logout, registration, and password reset.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    /// Creates the auth API over `client`.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Log in as an admin or super admin.
    pub async fn login(&self, credentials: &LoginRequest) -> AppResult<Session> {
        self.login_at(ADMIN_LOGIN, credentials).await
    }

    /// Log in as an onboarding manager.
    pub async fn onboarding_login(&self, credentials: &LoginRequest) -> AppResult<Session> {
        self.login_at(ONBOARDING_LOGIN, credentials).await
    }

    async fn login_at(&self, path: &str, credentials: &LoginRequest) -> AppResult<Session> {
        credentials.validate()?;

        let response: LoginResponse = self.client.post(path, credentials).await?;
        let session = response.into_session(&credentials.email);
        self.client.session().establish(session.clone())?;

        info!(endpoint = path, "Logged in");
        Ok(session)
    }

    /// Log out on the backend, then locally.
    ///
    /// The local session is erased even if the backend call fails.
    pub async fn logout(&self) -> AppResult<()> {
        let session = self.client.session();
        if session.is_authenticated() {
            if let Err(e) = self.client.post::<_, Value>(ADMIN_LOGOUT, &json!({})).await {
                warn!(error = %e, "Backend logout failed, clearing local session anyway");
            }
        }
        session.logout(LogoutReason::UserRequested);
        Ok(())
    }

    /// Register a new admin account. Returns the backend's message.
    pub async fn register_admin(&self, registration: &AdminRegistration) -> AppResult<Option<String>> {
        registration.validate()?;
        let body: Value = self.client.post(ADMIN_REGISTRATION, registration).await?;
        Ok(message_of(&body))
    }

    /// Ask for a password reset email.
    pub async fn forgot_password(&self, email: &str) -> AppResult<Option<String>> {
        let request = ForgotPasswordRequest {
            email: email.to_string(),
        };
        request.validate()?;
        let body: Value = self.client.post(FORGOT_PASSWORD, &request).await?;
        Ok(message_of(&body))
    }

    /// Set a new password using a reset token.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<Option<String>> {
        let request = ResetPasswordRequest {
            token: token.to_string(),
            new_password: new_password.to_string(),
        };
        request.validate()?;
        let body: Value = self.client.post(RESET_PASSWORD, &request).await?;
        Ok(message_of(&body))
    }
}

/// The renewer as the trait object the session manager expects.
pub fn renewer(http: reqwest::Client, base_url: &str) -> Arc<dyn TokenRenewer> {
    Arc::new(HttpTokenRenewer::new(http, base_url))
}
