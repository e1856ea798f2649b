//! Role assignment commands.

use clap::{Args, Subcommand};

use hrms_client::HrmsClient;
use hrms_core::error::AppError;
use hrms_entity::EntityId;
use hrms_entity::role_assignment::AssignRole;

use crate::output::{self, OutputFormat};

/// Arguments for role assignment commands
#[derive(Debug, Args)]
pub struct RoleAssignmentArgs {
    /// Role assignment subcommand
    #[command(subcommand)]
    pub command: RoleAssignmentCommand,
}

/// Role assignment subcommands
#[derive(Debug, Subcommand)]
pub enum RoleAssignmentCommand {
    /// List every employee with their job role, if any
    List,
    /// Assign a job role to an employee
    Assign {
        /// Employee ID
        employee_id: String,
        /// Job role ID
        role_id: String,
    },
    /// Remove an assignment
    Unassign {
        /// Assignment ID
        id: String,
    },
}

/// Execute role assignment commands
pub async fn execute(
    client: &HrmsClient,
    args: &RoleAssignmentArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let hook = &client.role_assignments;
    match &args.command {
        RoleAssignmentCommand::List => {
            let rows = hook.read().await?;
            output::print_records(&rows, format);
        }
        RoleAssignmentCommand::Assign {
            employee_id,
            role_id,
        } => {
            hook.assign(&AssignRole {
                employee_id: EntityId::new(employee_id.clone()),
                role_id: EntityId::new(role_id.clone()),
            })
            .await?;
            output::print_success(&format!(
                "Assigned role {} to employee {}",
                role_id, employee_id
            ));
        }
        RoleAssignmentCommand::Unassign { id } => {
            hook.unassign(&EntityId::new(id.clone())).await?;
            output::print_success(&format!("Removed assignment {}", id));
        }
    }
    Ok(())
}
