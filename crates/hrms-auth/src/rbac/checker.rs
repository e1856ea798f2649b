//! Access checks against the RBAC table.

use std::sync::Arc;

use tracing::debug;

use hrms_core::error::AppError;
use hrms_core::result::AppResult;
use hrms_entity::Role;

use super::policies::{Action, MenuItem, RbacPolicies, RouteRule};

/// Answers allow/deny questions for a role.
///
/// Every check denies when the role is `None` and when nothing in the
/// table matches.
#[derive(Debug, Clone)]
pub struct AccessChecker {
    policies: Arc<RbacPolicies>,
}

impl AccessChecker {
    /// Creates a checker with the built-in table.
    pub fn new() -> Self {
        Self::with_policies(RbacPolicies::new())
    }

    /// Creates a checker with a custom table.
    pub fn with_policies(policies: RbacPolicies) -> Self {
        Self {
            policies: Arc::new(policies),
        }
    }

    /// The underlying table.
    pub fn policies(&self) -> &RbacPolicies {
        &self.policies
    }

    /// The rule governing `path`.
    ///
    /// Exact paths are tried across the whole table before any sub-path
    /// pattern; the first hit wins.
    pub fn rule_for(&self, path: &str) -> Option<&RouteRule> {
        let path = strip_query(path);
        let routes = self.policies.routes();
        routes.iter().find(|r| r.path == path).or_else(|| {
            routes
                .iter()
                .find(|r| r.sub_paths.iter().any(|t| t.matches(path)))
        })
    }

    /// May `role` open `path`?
    pub fn has_route_access(&self, path: &str, role: Option<Role>) -> bool {
        let Some(role) = role else {
            return false;
        };
        match self.rule_for(path) {
            Some(rule) => rule.allows(role),
            None => {
                debug!(path, "No route rule matches, denying");
                false
            }
        }
    }

    /// May `role` perform `action` on `resource`?
    pub fn has_api_access(&self, resource: &str, action: Action, role: Option<Role>) -> bool {
        role.zip(self.policies.api_roles(resource, action))
            .is_some_and(|(role, allowed)| allowed.contains(&role))
    }

    /// Like [`has_api_access`](Self::has_api_access), as an error.
    pub fn require_api_access(
        &self,
        resource: &str,
        action: Action,
        role: Option<Role>,
    ) -> AppResult<()> {
        if self.has_api_access(resource, action, role) {
            return Ok(());
        }
        let who = role.map_or_else(|| "anonymous".to_string(), |r| r.to_string());
        Err(AppError::authorization(format!(
            "Role '{who}' may not {action} {resource}"
        )))
    }

    /// Menu entries visible to `role`, in menu order.
    pub fn menu_for(&self, role: Option<Role>) -> Vec<MenuItem> {
        let Some(role) = role else {
            return Vec::new();
        };
        let mut items: Vec<MenuItem> = self
            .policies
            .routes()
            .iter()
            .filter(|r| r.allows(role))
            .filter_map(|r| r.menu.clone())
            .collect();
        items.sort_by_key(|m| m.order);
        items
    }

    /// Is `path` reachable without a session?
    pub fn is_public_route(&self, path: &str) -> bool {
        let path = strip_query(path);
        self.policies.public_routes().iter().any(|p| p == path)
    }
}

impl Default for AccessChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// The path without its query string or fragment.
pub(crate) fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}
