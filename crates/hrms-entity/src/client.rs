//! Client (customer company) records.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::id::EntityId;

/// A client company served by the organisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Record id.
    pub id: EntityId,
    /// Company name.
    pub name: String,
    /// Primary contact email.
    pub email: Option<String>,
    /// Primary contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Lifecycle status as reported by the backend (e.g. `"active"`).
    pub status: Option<String>,
}

/// Payload for creating or updating a client.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    /// Company name.
    #[validate(length(min = 1, max = 200, message = "Client name is required"))]
    pub name: String,
    /// Primary contact email.
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    /// Primary contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
}
