//! Resource query cache configuration.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Policy used by resources without an override.
    #[serde(default)]
    pub default: CachePolicy,
    /// Per-resource overrides, keyed by resource key (e.g. `"clients"`).
    #[serde(default = "default_resources")]
    pub resources: HashMap<String, CachePolicy>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default: CachePolicy::default(),
            resources: default_resources(),
        }
    }
}

impl CacheConfig {
    /// Returns the policy for a resource, falling back to the default.
    pub fn policy_for(&self, resource: &str) -> CachePolicy {
        self.resources
            .get(resource)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }
}

/// Staleness and eviction windows for one resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachePolicy {
    /// Seconds after a fetch during which cached data is served as-is.
    #[serde(default = "default_stale")]
    pub stale_seconds: u64,
    /// Seconds of disuse after which an entry is evicted.
    #[serde(default = "default_expire")]
    pub expire_seconds: u64,
    /// Maximum number of cached query results.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Refetch stale entries when the window regains focus.
    #[serde(default)]
    pub refetch_on_focus: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            stale_seconds: default_stale(),
            expire_seconds: default_expire(),
            max_capacity: default_max_capacity(),
            refetch_on_focus: false,
        }
    }
}

impl CachePolicy {
    /// Create a policy from explicit windows.
    pub fn new(stale: Duration, expire: Duration) -> Self {
        Self {
            stale_seconds: stale.as_secs(),
            expire_seconds: expire.as_secs(),
            ..Self::default()
        }
    }

    /// The staleness window.
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_seconds)
    }

    /// The eviction window.
    pub fn expire_after(&self) -> Duration {
        Duration::from_secs(self.expire_seconds)
    }
}

fn default_stale() -> u64 {
    300
}

fn default_expire() -> u64 {
    1800
}

fn default_max_capacity() -> u64 {
    256
}

fn default_resources() -> HashMap<String, CachePolicy> {
    let mut resources = HashMap::new();
    resources.insert("employees".to_string(), windows(30, 300));
    resources.insert("role-assignments".to_string(), windows(30, 300));
    resources.insert("salaries".to_string(), windows(60, 600));
    resources.insert("departments".to_string(), windows(300, 1800));
    resources.insert("job-roles".to_string(), windows(300, 1800));
    resources
}

fn windows(stale_seconds: u64, expire_seconds: u64) -> CachePolicy {
    CachePolicy {
        stale_seconds,
        expire_seconds,
        ..CachePolicy::default()
    }
}
