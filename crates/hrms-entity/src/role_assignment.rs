//! Employee-to-job-role assignment records.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::id::{EntityId, validate_entity_id};

/// An employee as returned by the "assigned" listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedEmployee {
    /// Employee id.
    pub employee_id: EntityId,
    /// Display name.
    pub name: String,
    /// Work email.
    pub email: Option<String>,
    /// Assigned job role.
    pub role_id: EntityId,
    /// Assigned job role title.
    pub role_name: Option<String>,
}

/// An employee as returned by the "unassigned" listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignedEmployee {
    /// Employee id.
    pub employee_id: EntityId,
    /// Display name.
    pub name: String,
    /// Work email.
    pub email: Option<String>,
}

/// One row of the merged role-assignment screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRoleRow {
    /// Employee id.
    pub employee_id: EntityId,
    /// Display name.
    pub name: String,
    /// Work email.
    pub email: Option<String>,
    /// Assigned job role, if any.
    pub role_id: Option<EntityId>,
    /// Assigned job role title, if any.
    pub role_name: Option<String>,
    /// Whether the row came from the assigned listing.
    pub is_assigned: bool,
}

impl From<UnassignedEmployee> for EmployeeRoleRow {
    fn from(e: UnassignedEmployee) -> Self {
        Self {
            employee_id: e.employee_id,
            name: e.name,
            email: e.email,
            role_id: None,
            role_name: None,
            is_assigned: false,
        }
    }
}

impl From<AssignedEmployee> for EmployeeRoleRow {
    fn from(e: AssignedEmployee) -> Self {
        Self {
            employee_id: e.employee_id,
            name: e.name,
            email: e.email,
            role_id: Some(e.role_id),
            role_name: e.role_name,
            is_assigned: true,
        }
    }
}

/// Payload assigning a job role to an employee.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignRole {
    /// Employee receiving the role.
    #[validate(custom(function = "validate_entity_id", message = "Employee is required"))]
    pub employee_id: EntityId,
    /// Job role to assign.
    #[validate(custom(function = "validate_entity_id", message = "Role is required"))]
    pub role_id: EntityId,
}
