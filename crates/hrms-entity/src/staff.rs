//! Onboarding managers and recruiters.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::id::EntityId;

/// A staff member who onboards new hires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingManager {
    /// Record id.
    pub id: EntityId,
    /// Full name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Contact phone.
    pub phone: Option<String>,
}

/// A recruiter sourcing candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recruiter {
    /// Record id.
    pub id: EntityId,
    /// Full name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// External agency, if any.
    pub agency: Option<String>,
}

/// Payload for creating or updating onboarding managers and recruiters.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewStaffMember {
    /// Full name.
    #[validate(length(min = 1, max = 150, message = "Name is required"))]
    pub name: String,
    /// Contact email.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// External agency (recruiters only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency: Option<String>,
    /// Initial password (onboarding managers only).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}
