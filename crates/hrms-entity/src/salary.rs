//! Salary records.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::id::EntityId;

/// A salary entry for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Salary {
    /// Record id.
    pub id: EntityId,
    /// Employee receiving the salary.
    pub employee_id: EntityId,
    /// Gross amount per pay period.
    pub amount: f64,
    /// ISO currency code.
    pub currency: Option<String>,
    /// Date the amount takes effect (`YYYY-MM-DD`).
    pub effective_from: Option<String>,
}

/// Payload for creating or updating a salary entry.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSalary {
    /// Employee receiving the salary.
    pub employee_id: EntityId,
    /// Gross amount per pay period.
    #[validate(range(min = 0.0, message = "Salary amount cannot be negative"))]
    pub amount: f64,
    /// ISO currency code.
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: Option<String>,
    /// Date the amount takes effect (`YYYY-MM-DD`).
    pub effective_from: Option<String>,
}
