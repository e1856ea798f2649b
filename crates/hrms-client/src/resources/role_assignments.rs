//! Role assignment hook: two listings merged into one screen.

use std::collections::HashSet;

use serde_json::Value;
use tracing::info;
use validator::Validate;

use hrms_auth::{AccessChecker, Action};
use hrms_cache::{QueryParams, QueryState, ResourceCache};
use hrms_core::config::CachePolicy;
use hrms_core::result::AppResult;
use hrms_entity::EntityId;
use hrms_entity::role_assignment::{
    AssignRole, AssignedEmployee, EmployeeRoleRow, UnassignedEmployee,
};

use super::Gate;
use crate::http::ApiClient;

/// RBAC and cache key.
pub const KEY: &str = "role-assignments";
const ASSIGNED_PATH: &str = "/api/employee-role/assigned";
const UNASSIGNED_PATH: &str = "/api/employee-role/unassigned";
const ASSIGN_PATH: &str = "/api/employee-role/create";
const UNASSIGN_PATH: &str = "/api/employee-role/delete";

/// Merge both listings, one row per employee.
///
/// Unassigned rows go in first, so an employee present in both listings
/// keeps its unassigned shape.
pub fn merge_assignments(
    assigned: Vec<AssignedEmployee>,
    unassigned: Vec<UnassignedEmployee>,
) -> Vec<EmployeeRoleRow> {
    let mut seen: HashSet<EntityId> = HashSet::new();
    let mut rows = Vec::with_capacity(assigned.len() + unassigned.len());

    let unassigned = unassigned.into_iter().map(EmployeeRoleRow::from);
    let assigned = assigned.into_iter().map(EmployeeRoleRow::from);
    for row in unassigned.chain(assigned) {
        if seen.insert(row.employee_id.clone()) {
            rows.push(row);
        }
    }
    rows
}

/// Cached merged listing plus assign/unassign.
#[derive(Debug, Clone)]
pub struct RoleAssignments {
    client: ApiClient,
    gate: Gate,
    cache: ResourceCache<Vec<EmployeeRoleRow>>,
}

impl RoleAssignments {
    /// Creates the hook.
    pub fn new(
        client: ApiClient,
        checker: AccessChecker,
        policy: CachePolicy,
        enforce_rbac: bool,
    ) -> Self {
        Self {
            client,
            gate: Gate::new(checker, enforce_rbac),
            cache: ResourceCache::new(KEY, policy),
        }
    }

    /// The merged listing, from cache while fresh.
    pub async fn read(&self) -> AppResult<Vec<EmployeeRoleRow>> {
        self.gate.check(&self.client, KEY, Action::Read)?;
        let client = self.client.clone();
        self.cache
            .get_or_fetch(KEY, async move {
                let none = QueryParams::new();
                let (assigned, unassigned) = tokio::try_join!(
                    client.get::<Vec<AssignedEmployee>>(ASSIGNED_PATH, &none),
                    client.get::<Vec<UnassignedEmployee>>(UNASSIGNED_PATH, &none),
                )?;
                Ok(merge_assignments(assigned, unassigned))
            })
            .await
    }

    /// Current state without waiting.
    pub async fn snapshot(&self) -> QueryState<Vec<EmployeeRoleRow>> {
        self.cache.snapshot(KEY).await
    }

    /// Give an employee a job role.
    pub async fn assign(&self, assignment: &AssignRole) -> AppResult<Value> {
        self.gate.check(&self.client, KEY, Action::Create)?;
        assignment.validate()?;
        let body = self.client.post(ASSIGN_PATH, assignment).await?;
        info!(employee = %assignment.employee_id, role = %assignment.role_id, "Role assigned");
        self.cache.invalidate_all();
        Ok(body)
    }

    /// Remove an assignment.
    pub async fn unassign(&self, id: &EntityId) -> AppResult<Value> {
        self.gate.check(&self.client, KEY, Action::Delete)?;
        let body = self
            .client
            .delete(&format!("{UNASSIGN_PATH}/{id}"))
            .await?;
        info!(%id, "Role unassigned");
        self.cache.invalidate_all();
        Ok(body)
    }

    /// See [`Resource::on_window_focus`](super::Resource::on_window_focus).
    pub async fn on_window_focus(&self) -> bool {
        self.cache.on_focus(KEY).await
    }
}
