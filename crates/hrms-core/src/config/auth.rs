//! Session and access-control configuration.

use serde::{Deserialize, Serialize};

/// Where the session tokens are kept between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStoreKind {
    /// Process memory only.
    Memory,
    /// JSON file on disk, surviving restarts.
    #[default]
    File,
}

/// Session and access-control configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token store backend.
    #[serde(default)]
    pub token_store: TokenStoreKind,
    /// File used by the `file` token store.
    #[serde(default = "default_store_path")]
    pub token_store_path: String,
    /// Claim names tried in order when reading the role out of a token.
    #[serde(default = "default_role_claims")]
    pub role_claim_candidates: Vec<String>,
    /// Route that unauthenticated navigations are redirected to.
    #[serde(default = "default_login_route")]
    pub login_route: String,
    /// Route that unauthorized navigations are redirected to.
    #[serde(default = "default_unauthorized_route")]
    pub unauthorized_route: String,
    /// Check the RBAC table before issuing resource requests.
    #[serde(default = "default_true")]
    pub enforce_api_rbac: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_store: TokenStoreKind::default(),
            token_store_path: default_store_path(),
            role_claim_candidates: default_role_claims(),
            login_route: default_login_route(),
            unauthorized_route: default_unauthorized_route(),
            enforce_api_rbac: true,
        }
    }
}

fn default_store_path() -> String {
    "data/session.json".to_string()
}

fn default_role_claims() -> Vec<String> {
    ["role", "roleId", "role_id", "userRole", "user_role"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_login_route() -> String {
    "/login".to_string()
}

fn default_unauthorized_route() -> String {
    "/unauthorized".to_string()
}

fn default_true() -> bool {
    true
}
