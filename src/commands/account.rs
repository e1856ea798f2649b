//! Account commands: admin registration and password reset.

use clap::{Args, Subcommand};

use hrms_client::HrmsClient;
use hrms_client::dto::AdminRegistration;
use hrms_core::error::AppError;
use hrms_entity::Role;

use crate::output;

/// Arguments for account commands
#[derive(Debug, Args)]
pub struct AccountArgs {
    /// Account subcommand
    #[command(subcommand)]
    pub command: AccountCommand,
}

/// Account subcommands
#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Register an admin account (super admin only)
    Register {
        /// Full name
        #[arg(short, long)]
        name: String,
        /// Login email
        #[arg(short, long)]
        email: String,
        /// Role code or name (default: admin)
        #[arg(short, long, default_value = "admin")]
        role: Role,
        /// Contact phone
        #[arg(long)]
        phone: Option<String>,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Request a password reset email
    ForgotPassword {
        /// Account email
        email: String,
    },
    /// Set a new password with a reset token
    ResetPassword {
        /// Token from the reset email
        token: String,
        /// New password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
}

fn prompt_new_password(existing: &Option<String>) -> Result<String, AppError> {
    match existing {
        Some(p) => Ok(p.clone()),
        None => dialoguer::Password::new()
            .with_prompt("New password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()
            .map_err(super::input_error),
    }
}

/// Execute account commands
pub async fn execute(client: &HrmsClient, args: &AccountArgs) -> Result<(), AppError> {
    match &args.command {
        AccountCommand::Register {
            name,
            email,
            role,
            phone,
            password,
        } => {
            let registration = AdminRegistration {
                name: name.clone(),
                email: email.clone(),
                password: prompt_new_password(password)?,
                role: *role,
                phone: phone.clone(),
            };
            let message = client.auth().register_admin(&registration).await?;
            output::print_success(
                &message.unwrap_or_else(|| format!("Registered {} as {}", email, role)),
            );
        }
        AccountCommand::ForgotPassword { email } => {
            let message = client.auth().forgot_password(email).await?;
            output::print_success(
                &message.unwrap_or_else(|| format!("Reset instructions sent to {}", email)),
            );
        }
        AccountCommand::ResetPassword { token, password } => {
            let password = prompt_new_password(password)?;
            let message = client.auth().reset_password(token, &password).await?;
            output::print_success(&message.unwrap_or_else(|| "Password updated".to_string()));
        }
    }
    Ok(())
}
