//! The access-control table: routes, menu entries, and API permissions.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use hrms_core::error::AppError;
use hrms_core::result::AppResult;
use hrms_entity::Role;

use super::matcher::PathTemplate;

/// An operation on an API resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// List or fetch.
    Read,
    /// Create a record.
    Create,
    /// Modify a record.
    Update,
    /// Remove a record.
    Delete,
}

impl Action {
    /// Every action.
    pub const ALL: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Delete];

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" | "list" | "get" => Ok(Self::Read),
            "create" | "add" => Ok(Self::Create),
            "update" | "edit" => Ok(Self::Update),
            "delete" | "remove" => Ok(Self::Delete),
            other => Err(AppError::validation(format!("Unknown action '{other}'"))),
        }
    }
}

/// A navigation menu entry shown to roles that may open its route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    /// Label shown in the menu.
    pub label: String,
    /// Route the entry opens.
    pub path: String,
    /// Position in the menu.
    pub order: u32,
}

/// One protected route and the roles allowed to open it.
#[derive(Debug, Clone)]
pub struct RouteRule {
    /// Path matched exactly.
    pub path: String,
    /// Roles allowed; never empty.
    pub roles: BTreeSet<Role>,
    /// Further paths governed by this rule, tried after every exact path.
    pub sub_paths: Vec<PathTemplate>,
    /// Menu entry, if the route appears in the menu.
    pub menu: Option<MenuItem>,
}

impl RouteRule {
    /// A rule for `path` open to `roles`.
    pub fn new(path: &str, roles: &[Role]) -> Self {
        Self {
            path: path.to_string(),
            roles: roles.iter().copied().collect(),
            sub_paths: Vec::new(),
            menu: None,
        }
    }

    /// Add sub-path patterns.
    pub fn with_sub_paths(mut self, patterns: &[&str]) -> Self {
        self.sub_paths
            .extend(patterns.iter().map(|p| PathTemplate::parse(p)));
        self
    }

    /// Show the route in the menu.
    pub fn with_menu(mut self, label: &str, order: u32) -> Self {
        self.menu = Some(MenuItem {
            label: label.to_string(),
            path: self.path.clone(),
            order,
        });
        self
    }

    /// Returns `true` if `role` is allowed.
    pub fn allows(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Resource → action → allowed roles.
pub type ApiTable = HashMap<String, HashMap<Action, BTreeSet<Role>>>;

/// The complete, immutable access-control table.
#[derive(Debug, Clone)]
pub struct RbacPolicies {
    routes: Vec<RouteRule>,
    api: ApiTable,
    public_routes: Vec<String>,
}

impl RbacPolicies {
    /// The console's built-in table.
    pub fn new() -> Self {
        use Role::{Admin as A, Employee as E, OnboardingManager as OM, SuperAdmin as SA};

        let all = [SA, A, E, OM];

        let routes = vec![
            RouteRule::new("/", &all).with_menu("Dashboard", 0),
            RouteRule::new("/clients", &[SA, A])
                .with_sub_paths(&["/clients/add", "/clients/edit/:id", "/clients/view/:id"])
                .with_menu("Clients", 10),
            RouteRule::new("/employees", &[SA, A, OM])
                .with_sub_paths(&[
                    "/employees/add",
                    "/employees/edit/:id",
                    "/employees/view/:id",
                ])
                .with_menu("Employees", 20),
            RouteRule::new("/departments", &[SA, A])
                .with_sub_paths(&["/departments/add", "/departments/edit/:id"])
                .with_menu("Departments", 30),
            RouteRule::new("/job-roles", &[SA, A])
                .with_sub_paths(&["/job-roles/add", "/job-roles/edit/:id"])
                .with_menu("Job Roles", 40),
            RouteRule::new("/role-assignments", &[SA, A])
                .with_sub_paths(&["/role-assignments/assign/:employeeId"])
                .with_menu("Role Assignments", 50),
            RouteRule::new("/salaries", &[SA, A])
                .with_sub_paths(&["/salary/add", "/salary/edit/:id"])
                .with_menu("Salaries", 60),
            RouteRule::new("/onboarding-managers", &[SA])
                .with_sub_paths(&["/onboarding-managers/add", "/onboarding-managers/edit/:id"])
                .with_menu("Onboarding Managers", 70),
            RouteRule::new("/recruiters", &[SA, A, OM])
                .with_sub_paths(&["/recruiters/add", "/recruiters/edit/:id"])
                .with_menu("Recruiters", 80),
            RouteRule::new("/admin-registration", &[SA]).with_menu("Register Admin", 90),
            RouteRule::new("/my-salary", &[E]).with_menu("My Salary", 100),
            RouteRule::new("/profile", &all).with_menu("Profile", 110),
            RouteRule::new("/unauthorized", &all),
        ];

        let mut api = ApiTable::new();
        let mut grant = |resource: &str, actions: &[Action], roles: &[Role]| {
            let entry = api.entry(resource.to_string()).or_default();
            for action in actions {
                entry
                    .entry(*action)
                    .or_default()
                    .extend(roles.iter().copied());
            }
        };

        use Action::{Create, Delete, Read, Update};

        grant("clients", &[Read, Create, Update], &[SA, A]);
        grant("clients", &[Delete], &[SA]);

        grant("employees", &[Read, Create], &[SA, A, OM]);
        grant("employees", &[Update], &[SA, A]);
        grant("employees", &[Delete], &[SA]);

        grant("departments", &[Read], &all);
        grant("departments", &[Create, Update], &[SA, A]);
        grant("departments", &[Delete], &[SA]);

        grant("job-roles", &[Read], &all);
        grant("job-roles", &[Create, Update], &[SA, A]);
        grant("job-roles", &[Delete], &[SA]);

        grant("role-assignments", &Action::ALL, &[SA, A]);

        grant("salaries", &[Read, Create, Update], &[SA, A]);
        grant("salaries", &[Delete], &[SA]);

        grant("onboarding-managers", &[Read], &[SA, A]);
        grant("onboarding-managers", &[Create, Update, Delete], &[SA]);

        grant("recruiters", &[Read], &[SA, A, OM]);
        grant("recruiters", &[Create, Update], &[SA, A]);
        grant("recruiters", &[Delete], &[SA]);

        let public_routes = [
            "/login",
            "/onboarding-manager/login",
            "/forgot-password",
            "/reset-password",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Self {
            routes,
            api,
            public_routes,
        }
    }

    /// A custom table.
    ///
    /// Fails if any route or API entry allows no role at all.
    pub fn with_rules(
        routes: Vec<RouteRule>,
        api: ApiTable,
        public_routes: Vec<String>,
    ) -> AppResult<Self> {
        if let Some(rule) = routes.iter().find(|r| r.roles.is_empty()) {
            return Err(AppError::configuration(format!(
                "Route '{}' allows no role",
                rule.path
            )));
        }
        for (resource, actions) in &api {
            if let Some((action, _)) = actions.iter().find(|(_, roles)| roles.is_empty()) {
                return Err(AppError::configuration(format!(
                    "API entry '{resource}:{action}' allows no role"
                )));
            }
        }

        Ok(Self {
            routes,
            api,
            public_routes,
        })
    }

    /// Route rules in declaration order.
    pub fn routes(&self) -> &[RouteRule] {
        &self.routes
    }

    /// The API table.
    pub fn api(&self) -> &ApiTable {
        &self.api
    }

    /// Roles allowed to perform `action` on `resource`.
    pub fn api_roles(&self, resource: &str, action: Action) -> Option<&BTreeSet<Role>> {
        self.api.get(resource)?.get(&action)
    }

    /// Routes reachable without a session.
    pub fn public_routes(&self) -> &[String] {
        &self.public_routes
    }
}

impl Default for RbacPolicies {
    fn default() -> Self {
        Self::new()
    }
}
