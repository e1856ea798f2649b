//! CLI command definitions and dispatch.

pub mod access;
pub mod account;
pub mod resource;
pub mod role_assignment;
pub mod session;

use clap::{Parser, Subcommand};

use hrms_client::HrmsClient;
use hrms_core::error::AppError;

use crate::output::OutputFormat;

/// HRMS console: session, access control, and HR records from the terminal
#[derive(Debug, Parser)]
#[command(name = "hrms", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file (without extension)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay, loaded from `config/<env>`
    #[arg(short, long, env = "HRMS_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in and store the session
    Login(session::LoginArgs),
    /// Log out and erase the stored session
    Logout,
    /// Show the stored session
    Whoami,
    /// Renew the access token now
    Renew,
    /// Evaluate a navigation as the route guard would
    Navigate(access::NavigateArgs),
    /// Check API access for the current role
    Can(access::CanArgs),
    /// Show the menu for the current role
    Menu,
    /// List records of a resource
    List(resource::ListArgs),
    /// Create a record
    Create(resource::CreateArgs),
    /// Update a record
    Update(resource::UpdateArgs),
    /// Delete a record
    Delete(resource::DeleteArgs),
    /// Employee role assignments
    RoleAssignments(role_assignment::RoleAssignmentArgs),
    /// Account registration and password reset
    Account(account::AccountArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, client: &HrmsClient) -> Result<(), AppError> {
        match &self.command {
            Commands::Login(args) => session::login(client, args).await,
            Commands::Logout => session::logout(client).await,
            Commands::Whoami => session::whoami(client, self.format),
            Commands::Renew => session::renew(client).await,
            Commands::Navigate(args) => access::navigate(client, args, self.format),
            Commands::Can(args) => access::can(client, args),
            Commands::Menu => access::menu(client, self.format),
            Commands::List(args) => resource::list(client, args, self.format).await,
            Commands::Create(args) => resource::create(client, args, self.format).await,
            Commands::Update(args) => resource::update(client, args, self.format).await,
            Commands::Delete(args) => resource::delete(client, args).await,
            Commands::RoleAssignments(args) => {
                role_assignment::execute(client, args, self.format).await
            }
            Commands::Account(args) => account::execute(client, args).await,
        }
    }
}

/// Map a prompt failure to an application error.
pub fn input_error(e: dialoguer::Error) -> AppError {
    AppError::internal(format!("Input error: {}", e))
}
