//! Employee records.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::id::EntityId;

/// An employee of the organisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Record id.
    pub id: EntityId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: Option<String>,
    /// Work email.
    pub email: Option<String>,
    /// Work phone.
    pub phone: Option<String>,
    /// Department the employee belongs to.
    pub department_id: Option<EntityId>,
    /// Job role held by the employee.
    pub job_role_id: Option<EntityId>,
    /// Start date (`YYYY-MM-DD`).
    pub joined_on: Option<String>,
}

impl Employee {
    /// Full display name.
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

/// Payload for creating or updating an employee.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    /// Given name.
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    /// Family name.
    pub last_name: Option<String>,
    /// Work email.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Work phone.
    pub phone: Option<String>,
    /// Department the employee belongs to.
    pub department_id: Option<EntityId>,
    /// Job role held by the employee.
    pub job_role_id: Option<EntityId>,
    /// Start date (`YYYY-MM-DD`).
    pub joined_on: Option<String>,
}
