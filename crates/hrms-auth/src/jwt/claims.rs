//! Claims carried by access tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use hrms_entity::Role;

/// Decoded token payload.
///
/// Only the timestamps are typed; every other claim is kept as raw JSON
/// because the backend does not use fixed claim names for identity fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiration timestamp (seconds since epoch).
    #[serde(default, deserialize_with = "numeric_date")]
    pub exp: Option<i64>,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default, deserialize_with = "numeric_date")]
    pub iat: Option<i64>,
    /// All remaining claims.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// NumericDate values may carry a fractional part; whole seconds are kept.
fn numeric_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.map(|secs| secs.floor() as i64))
}

impl TokenClaims {
    /// Raw value of a claim.
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.extra.get(name).filter(|v| !v.is_null())
    }

    /// A claim rendered as a string; numbers are formatted.
    pub fn string_claim(&self, name: &str) -> Option<String> {
        match self.claim(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Resolve the role by trying `candidates` in order.
    ///
    /// The first candidate present in the token decides; a present but
    /// unrecognizable value yields `None` rather than falling through.
    pub fn role(&self, candidates: &[String]) -> Option<Role> {
        candidates
            .iter()
            .find_map(|name| self.claim(name))
            .and_then(Role::from_claim)
    }

    /// Expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Checks expiry against `now` (seconds since epoch).
    ///
    /// A token without an `exp` claim counts as expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        match self.exp {
            Some(exp) => exp < now,
            None => true,
        }
    }

    /// Remaining lifetime in seconds (0 if expired).
    pub fn remaining_ttl_seconds(&self) -> u64 {
        let remaining = self.exp.unwrap_or(0).saturating_sub(Utc::now().timestamp());
        if remaining > 0 { remaining as u64 } else { 0 }
    }
}
