//! Job role records.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::id::EntityId;

/// A job title that employees can be assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRole {
    /// Record id.
    pub id: EntityId,
    /// Job title.
    pub title: String,
    /// Owning department.
    pub department_id: Option<EntityId>,
    /// Free-text description.
    pub description: Option<String>,
}

/// Payload for creating or updating a job role.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewJobRole {
    /// Job title.
    #[validate(length(min = 1, max = 120, message = "Job title is required"))]
    pub title: String,
    /// Owning department.
    pub department_id: Option<EntityId>,
    /// Free-text description.
    pub description: Option<String>,
}
