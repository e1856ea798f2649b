//! Console role enumeration.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Roles known to the RBAC table.
///
/// The backend represents roles as small integers; that code is also the
/// serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Full system administrator.
    SuperAdmin,
    /// HR administrator.
    Admin,
    /// Regular employee.
    Employee,
    /// Staff onboarding new hires.
    OnboardingManager,
}

impl Role {
    /// All roles, in code order.
    pub const ALL: [Role; 4] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::Employee,
        Role::OnboardingManager,
    ];

    /// The backend's integer code for this role.
    pub fn code(&self) -> u8 {
        match self {
            Self::SuperAdmin => 1,
            Self::Admin => 2,
            Self::Employee => 3,
            Self::OnboardingManager => 4,
        }
    }

    /// Resolve a role from its integer code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::SuperAdmin),
            2 => Some(Self::Admin),
            3 => Some(Self::Employee),
            4 => Some(Self::OnboardingManager),
            _ => None,
        }
    }

    /// Resolve a role from an arbitrary JSON claim value.
    ///
    /// Accepts integer codes, numeric strings, and role names.
    pub fn from_claim(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_i64().and_then(Self::from_code),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Return the role as a snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Employee => "employee",
            Self::OnboardingManager => "onboarding_manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i64>() {
            return Self::from_code(code).ok_or_else(|| format!("Unknown role code: {code}"));
        }
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "superadmin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "employee" => Ok(Self::Employee),
            "onboardingmanager" => Ok(Self::OnboardingManager),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_claim(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid role: {value}")))
    }
}
