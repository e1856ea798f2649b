//! Token decoding and expiry checks.
//!
//! The console never verifies signatures; that is the backend's job. It
//! only reads the payload to decide whether a token is worth sending.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use tracing::debug;

use hrms_core::error::AppError;
use hrms_core::result::AppResult;
use hrms_entity::Role;

use super::claims::TokenClaims;

/// Decodes token payloads and answers expiry questions.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    /// Claim names tried in order when resolving the role.
    role_claims: Vec<String>,
}

impl TokenValidator {
    /// Creates a validator with an ordered list of role claim names.
    pub fn new(role_claims: Vec<String>) -> Self {
        Self { role_claims }
    }

    /// The role claim names, in the order they are tried.
    pub fn role_claims(&self) -> &[String] {
        &self.role_claims
    }

    /// Decodes the payload segment of a compact JWS.
    pub fn decode(&self, token: &str) -> AppResult<TokenClaims> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AppError::authentication("Invalid token format"));
        };

        decode_segment(header)?;
        let bytes = decode_segment(payload)?;

        serde_json::from_slice::<TokenClaims>(&bytes)
            .map_err(|e| AppError::authentication(format!("Invalid token claims: {e}")))
    }

    /// Returns `true` unless `token` decodes and its `exp` is not in the past.
    ///
    /// Missing, malformed, or undecodable tokens count as expired. This
    /// never fails.
    pub fn is_expired(&self, token: Option<&str>) -> bool {
        self.is_expired_at(token, Utc::now().timestamp())
    }

    /// [`is_expired`](Self::is_expired) against an explicit clock.
    pub fn is_expired_at(&self, token: Option<&str>, now: i64) -> bool {
        let Some(token) = token else {
            return true;
        };
        match self.decode(token) {
            Ok(claims) => claims.is_expired_at(now),
            Err(e) => {
                debug!(error = %e, "Treating undecodable token as expired");
                true
            }
        }
    }

    /// Role carried by the token, if any candidate claim resolves.
    pub fn role_of(&self, token: &str) -> Option<Role> {
        self.decode(token).ok()?.role(&self.role_claims)
    }
}

fn decode_segment(segment: &str) -> AppResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| AppError::authentication(format!("Invalid token encoding: {e}")))
}
