//! Session commands: login, logout, whoami, renew.

use clap::Args;
use serde::Serialize;

use hrms_auth::TokenClaims;
use hrms_client::HrmsClient;
use hrms_client::dto::LoginRequest;
use hrms_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for `login`
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Login email
    #[arg(short, long)]
    pub email: Option<String>,
    /// Password (will prompt if not provided)
    #[arg(short, long)]
    pub password: Option<String>,
    /// Use the onboarding manager login
    #[arg(long)]
    pub onboarding: bool,
}

/// Log in and persist the session.
pub async fn login(client: &HrmsClient, args: &LoginArgs) -> Result<(), AppError> {
    let email = match &args.email {
        Some(e) => e.clone(),
        None => dialoguer::Input::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(super::input_error)?,
    };
    let password = match &args.password {
        Some(p) => p.clone(),
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(super::input_error)?,
    };

    let credentials = LoginRequest { email, password };
    let session = if args.onboarding {
        client.auth().onboarding_login(&credentials).await?
    } else {
        client.auth().login(&credentials).await?
    };

    let role = session
        .role
        .map_or_else(|| "unknown role".to_string(), |r| r.to_string());
    output::print_success(&format!("Logged in as {} ({})", credentials.email, role));
    Ok(())
}

/// Log out on the backend and locally.
pub async fn logout(client: &HrmsClient) -> Result<(), AppError> {
    client.auth().logout().await?;
    output::print_success("Logged out");
    Ok(())
}

#[derive(Debug, Serialize)]
struct WhoAmI {
    authenticated: bool,
    role: Option<String>,
    user_id: Option<String>,
    email: Option<String>,
    username: Option<String>,
    expires_at: Option<String>,
    remaining_seconds: Option<u64>,
}

/// Show the stored session.
pub fn whoami(client: &HrmsClient, format: OutputFormat) -> Result<(), AppError> {
    let manager = client.session();
    let session = manager.session();
    let claims: Option<TokenClaims> = session
        .access_token
        .as_deref()
        .and_then(|t| manager.validator().decode(t).ok());

    let info = WhoAmI {
        authenticated: manager.is_authenticated(),
        role: manager.current_role().map(|r| r.to_string()),
        user_id: session.user_id,
        email: session.email,
        username: session.username,
        expires_at: claims
            .as_ref()
            .and_then(TokenClaims::expires_at)
            .map(|t| t.to_rfc3339()),
        remaining_seconds: claims.as_ref().map(TokenClaims::remaining_ttl_seconds),
    };

    match format {
        OutputFormat::Json => output::print_item(&info, format),
        OutputFormat::Table => {
            let dash = || "-".to_string();
            output::print_kv("Authenticated", &info.authenticated.to_string());
            output::print_kv("Role", &info.role.clone().unwrap_or_else(dash));
            output::print_kv("User ID", &info.user_id.clone().unwrap_or_else(dash));
            output::print_kv("Email", &info.email.clone().unwrap_or_else(dash));
            output::print_kv("Username", &info.username.clone().unwrap_or_else(dash));
            output::print_kv("Expires", &info.expires_at.clone().unwrap_or_else(dash));
            if let Some(remaining) = info.remaining_seconds {
                output::print_kv("Remaining", &format!("{remaining}s"));
            }
        }
    }
    Ok(())
}

/// Renew the access token immediately.
pub async fn renew(client: &HrmsClient) -> Result<(), AppError> {
    match client.session().renew().await {
        Some(_) => {
            output::print_success("Access token renewed");
            Ok(())
        }
        None => Err(AppError::authentication("Session expired, please log in again")),
    }
}
