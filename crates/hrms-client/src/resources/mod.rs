//! Resource data hooks.
//!
//! Every REST resource gets the same treatment: a cached, role-checked
//! list read and writes that invalidate the whole resource on success.

pub mod role_assignments;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use validator::Validate;

use hrms_auth::{AccessChecker, Action};
use hrms_cache::keys::query_key;
use hrms_cache::{QueryParams, QueryState, ResourceCache};
use hrms_core::config::CachePolicy;
use hrms_core::result::AppResult;
use hrms_entity::EntityId;

pub use role_assignments::{RoleAssignments, merge_assignments};

/// Static description of a REST resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSpec {
    /// RBAC and cache key, e.g. `"job-roles"`.
    pub key: &'static str,
    /// Collection path, e.g. `"/api/job-roles"`.
    pub base_path: &'static str,
}

impl ResourceSpec {
    /// `POST` target.
    pub fn create_path(&self) -> String {
        format!("{}/create", self.base_path)
    }

    /// `PUT` target.
    pub fn update_path(&self, id: &EntityId) -> String {
        format!("{}/update/{}", self.base_path, id)
    }

    /// `DELETE` target.
    pub fn delete_path(&self, id: &EntityId) -> String {
        format!("{}/delete/{}", self.base_path, id)
    }
}

/// Client companies.
pub const CLIENTS: ResourceSpec = ResourceSpec {
    key: "clients",
    base_path: "/api/clients",
};
/// Employees.
pub const EMPLOYEES: ResourceSpec = ResourceSpec {
    key: "employees",
    base_path: "/api/employees",
};
/// Departments.
pub const DEPARTMENTS: ResourceSpec = ResourceSpec {
    key: "departments",
    base_path: "/api/departments",
};
/// Job roles.
pub const JOB_ROLES: ResourceSpec = ResourceSpec {
    key: "job-roles",
    base_path: "/api/job-roles",
};
/// Salaries.
pub const SALARIES: ResourceSpec = ResourceSpec {
    key: "salaries",
    base_path: "/api/salaries",
};
/// Onboarding managers.
pub const ONBOARDING_MANAGERS: ResourceSpec = ResourceSpec {
    key: "onboarding-managers",
    base_path: "/api/onboarding-managers",
};
/// Recruiters.
pub const RECRUITERS: ResourceSpec = ResourceSpec {
    key: "recruiters",
    base_path: "/api/recruiters",
};

/// Every plain CRUD resource.
pub const ALL: [ResourceSpec; 7] = [
    CLIENTS,
    EMPLOYEES,
    DEPARTMENTS,
    JOB_ROLES,
    SALARIES,
    ONBOARDING_MANAGERS,
    RECRUITERS,
];

/// Look up a resource by its key.
pub fn spec_for(key: &str) -> Option<ResourceSpec> {
    ALL.iter().copied().find(|s| s.key == key)
}

/// Role check shared by every hook.
#[derive(Debug, Clone)]
pub(crate) struct Gate {
    checker: AccessChecker,
    enforce: bool,
}

impl Gate {
    pub(crate) fn new(checker: AccessChecker, enforce: bool) -> Self {
        Self { checker, enforce }
    }

    pub(crate) fn check(
        &self,
        client: &crate::http::ApiClient,
        resource: &str,
        action: Action,
    ) -> AppResult<()> {
        if !self.enforce {
            return Ok(());
        }
        self.checker
            .require_api_access(resource, action, client.session().current_role())
    }
}

/// Cached list read plus writes for one resource.
#[derive(Debug, Clone)]
pub struct Resource<T>
where
    T: Clone + Send + Sync + 'static,
{
    spec: ResourceSpec,
    client: crate::http::ApiClient,
    gate: Gate,
    cache: ResourceCache<Vec<T>>,
}

impl<T> Resource<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Creates a hook for `spec`.
    pub fn new(
        spec: ResourceSpec,
        client: crate::http::ApiClient,
        checker: AccessChecker,
        policy: CachePolicy,
        enforce_rbac: bool,
    ) -> Self {
        Self {
            spec,
            client,
            gate: Gate::new(checker, enforce_rbac),
            cache: ResourceCache::new(spec.key, policy),
        }
    }

    /// The resource served by this hook.
    pub fn spec(&self) -> ResourceSpec {
        self.spec
    }

    /// The underlying cache.
    pub fn cache(&self) -> &ResourceCache<Vec<T>> {
        &self.cache
    }

    /// List records matching `params`, from cache while fresh.
    pub async fn read(&self, params: &QueryParams) -> AppResult<Vec<T>> {
        self.gate.check(&self.client, self.spec.key, Action::Read)?;
        let key = query_key(self.spec.key, params);
        let client = self.client.clone();
        let path = self.spec.base_path;
        self.cache
            .get_or_fetch(&key, async move { client.get::<Vec<T>>(path, params).await })
            .await
    }

    /// Current state of the query for `params` without waiting.
    pub async fn snapshot(&self, params: &QueryParams) -> QueryState<Vec<T>> {
        self.cache.snapshot(&query_key(self.spec.key, params)).await
    }

    /// Create a record. Invalidates this resource on success.
    pub async fn create<D>(&self, draft: &D) -> AppResult<Value>
    where
        D: Serialize + Validate + Sync,
    {
        self.gate.check(&self.client, self.spec.key, Action::Create)?;
        draft.validate()?;
        let created = self.client.post(&self.spec.create_path(), draft).await?;
        self.after_write(Action::Create);
        Ok(created)
    }

    /// Update a record. Invalidates this resource on success.
    pub async fn update<D>(&self, id: &EntityId, draft: &D) -> AppResult<Value>
    where
        D: Serialize + Validate + Sync,
    {
        self.gate.check(&self.client, self.spec.key, Action::Update)?;
        draft.validate()?;
        let updated = self.client.put(&self.spec.update_path(id), draft).await?;
        self.after_write(Action::Update);
        Ok(updated)
    }

    /// Delete a record. Invalidates this resource on success.
    pub async fn delete(&self, id: &EntityId) -> AppResult<Value> {
        self.gate.check(&self.client, self.spec.key, Action::Delete)?;
        let deleted = self.client.delete(&self.spec.delete_path(id)).await?;
        self.after_write(Action::Delete);
        Ok(deleted)
    }

    /// Window regained focus. Returns `true` if the next read refetches;
    /// always `false` unless the policy enables focus refetching.
    pub async fn on_window_focus(&self, params: &QueryParams) -> bool {
        let refetch = self.cache.on_focus(&query_key(self.spec.key, params)).await;
        debug!(resource = self.spec.key, refetch, "Window focus");
        refetch
    }

    /// Force the next read of every query to refetch.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }

    fn after_write(&self, action: Action) {
        info!(resource = self.spec.key, %action, "Write succeeded, invalidating cache");
        self.cache.invalidate_all();
    }
}
