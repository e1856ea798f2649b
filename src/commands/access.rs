//! Access-control commands: navigate, can, menu.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use hrms_auth::{Action, GuardDecision};
use hrms_client::HrmsClient;
use hrms_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for `navigate`
#[derive(Debug, Args)]
pub struct NavigateArgs {
    /// Route path, e.g. `/clients` or `/salary/edit/42`
    pub path: String,
}

/// Arguments for `can`
#[derive(Debug, Args)]
pub struct CanArgs {
    /// Resource key, e.g. `employees`
    pub resource: String,
    /// Action: read, create, update, or delete
    pub action: Action,
}

/// Menu display row
#[derive(Debug, Serialize, Tabled)]
struct MenuRow {
    /// Menu label
    label: String,
    /// Route
    path: String,
}

/// Evaluate a navigation.
pub fn navigate(
    client: &HrmsClient,
    args: &NavigateArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let decision = client.guard().navigate(&args.path);
    if format == OutputFormat::Json {
        output::print_item(&decision, format);
        return Ok(());
    }

    match &decision {
        GuardDecision::Public { path } => output::print_success(&format!("{path} is public")),
        GuardDecision::Authorized { path, .. } => {
            output::print_success(&format!("{path} renders"))
        }
        GuardDecision::Unauthorized { from, redirect_to } => output::print_warning(&format!(
            "Not allowed to open {from}, redirecting to {redirect_to}"
        )),
        GuardDecision::Unauthenticated { from, redirect_to } => output::print_warning(&format!(
            "Not logged in, redirecting to {redirect_to} (from {from})"
        )),
    }
    Ok(())
}

/// Check API access for the current role.
pub fn can(client: &HrmsClient, args: &CanArgs) -> Result<(), AppError> {
    let role = client.session().current_role();
    let allowed = client
        .checker()
        .has_api_access(&args.resource, args.action, role);
    let who = role.map_or_else(|| "anonymous".to_string(), |r| r.to_string());

    if allowed {
        output::print_success(&format!("{who} may {} {}", args.action, args.resource));
    } else {
        output::print_warning(&format!("{who} may not {} {}", args.action, args.resource));
    }
    Ok(())
}

/// Show the menu for the current role.
pub fn menu(client: &HrmsClient, format: OutputFormat) -> Result<(), AppError> {
    let role = client.session().current_role();
    let rows: Vec<MenuRow> = client
        .checker()
        .menu_for(role)
        .into_iter()
        .map(|m| MenuRow {
            label: m.label,
            path: m.path,
        })
        .collect();
    output::print_list(&rows, format);
    Ok(())
}
