//! Department records.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::id::EntityId;

/// An organisational department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    /// Record id.
    pub id: EntityId,
    /// Department name.
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Employee heading the department.
    pub head_id: Option<EntityId>,
}

/// Payload for creating or updating a department.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewDepartment {
    /// Department name.
    #[validate(length(min = 1, max = 120, message = "Department name is required"))]
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Employee heading the department.
    pub head_id: Option<EntityId>,
}
