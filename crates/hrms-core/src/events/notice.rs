//! User-visible notices.

use serde::{Deserialize, Serialize};

/// A message the presentation layer should show to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum Notice {
    /// The session expired and the user must log in again.
    SessionExpired,
    /// The backend could not be reached.
    Connectivity,
    /// Free-form informational message.
    Message(String),
}

impl Notice {
    /// Text shown to the user.
    pub fn text(&self) -> &str {
        match self {
            Self::SessionExpired => "Your session has expired. Please log in again.",
            Self::Connectivity => "Unable to reach the server. Check your connection.",
            Self::Message(msg) => msg,
        }
    }
}
