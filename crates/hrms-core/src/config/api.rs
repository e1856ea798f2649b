//! Backend API configuration.

use serde::{Deserialize, Serialize};

/// Settings for the REST backend and the authenticated HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Transport timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Maximum renew-and-retry attempts within one burst of 401 responses.
    #[serde(default = "default_max_retries")]
    pub max_auth_retries: u32,
    /// Backoff unit in milliseconds; attempt `n` waits `n` units.
    #[serde(default = "default_backoff")]
    pub retry_backoff_ms: u64,
    /// Endpoints that are sent without a bearer token.
    #[serde(default = "default_public_endpoints")]
    pub public_endpoints: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            max_auth_retries: default_max_retries(),
            retry_backoff_ms: default_backoff(),
            public_endpoints: default_public_endpoints(),
        }
    }
}

impl ApiConfig {
    /// Returns `true` if the endpoint path must not carry a bearer token.
    pub fn is_public_endpoint(&self, path: &str) -> bool {
        let path = path.split('?').next().unwrap_or(path);
        self.public_endpoints.iter().any(|p| p == path)
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff() -> u64 {
    1000
}

fn default_public_endpoints() -> Vec<String> {
    [
        "/api/admin-login",
        "/api/renew-token",
        "/api/admin-registration/create",
        "/api/onboarding-manager/login",
        "/api/forgot-password",
        "/api/reset-password",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
