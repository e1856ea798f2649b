//! Wiring: one [`HrmsClient`] per console process.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::info;

use hrms_auth::session::store;
use hrms_auth::{AccessChecker, RouteGuard, SessionManager, TokenStore};
use hrms_core::EventBus;
use hrms_core::config::AppConfig;
use hrms_core::result::AppResult;
use hrms_entity::client::Client;
use hrms_entity::department::Department;
use hrms_entity::employee::Employee;
use hrms_entity::job_role::JobRole;
use hrms_entity::salary::Salary;
use hrms_entity::staff::{OnboardingManager, Recruiter};

use crate::auth::{self, AuthApi};
use crate::http::{ApiClient, build_transport};
use crate::resources::{self, Resource, ResourceSpec, RoleAssignments};

fn resource<T>(
    spec: ResourceSpec,
    api: &ApiClient,
    checker: &AccessChecker,
    config: &AppConfig,
) -> Resource<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    Resource::new(
        spec,
        api.clone(),
        checker.clone(),
        config.cache.policy_for(spec.key),
        config.auth.enforce_api_rbac,
    )
}

/// Everything a screen needs, built from configuration.
#[derive(Debug, Clone)]
pub struct HrmsClient {
    events: EventBus,
    session: SessionManager,
    checker: AccessChecker,
    guard: RouteGuard,
    api: ApiClient,
    auth: AuthApi,
    /// Client companies.
    pub clients: Resource<Client>,
    /// Employees.
    pub employees: Resource<Employee>,
    /// Departments.
    pub departments: Resource<Department>,
    /// Job roles.
    pub job_roles: Resource<JobRole>,
    /// Salaries.
    pub salaries: Resource<Salary>,
    /// Onboarding managers.
    pub onboarding_managers: Resource<OnboardingManager>,
    /// Recruiters.
    pub recruiters: Resource<Recruiter>,
    /// Employee role assignments.
    pub role_assignments: RoleAssignments,
}

impl HrmsClient {
    /// Build with the token store selected in `[auth]`.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let store = store::from_config(&config.auth)?;
        Self::with_store(config, store)
    }

    /// Build over an explicit token store.
    pub fn with_store(config: &AppConfig, store: Arc<dyn TokenStore>) -> AppResult<Self> {
        let events = EventBus::new();
        let http = build_transport(&config.api)?;

        let session = SessionManager::from_config(
            &config.auth,
            store,
            auth::renewer(http.clone(), &config.api.base_url),
            events.clone(),
        );
        let checker = AccessChecker::new();
        let guard = RouteGuard::from_config(&config.auth, session.clone(), checker.clone());
        let api = ApiClient::new(&config.api, http, session.clone());

        let client = Self {
            clients: resource(resources::CLIENTS, &api, &checker, config),
            employees: resource(resources::EMPLOYEES, &api, &checker, config),
            departments: resource(resources::DEPARTMENTS, &api, &checker, config),
            job_roles: resource(resources::JOB_ROLES, &api, &checker, config),
            salaries: resource(resources::SALARIES, &api, &checker, config),
            onboarding_managers: resource(resources::ONBOARDING_MANAGERS, &api, &checker, config),
            recruiters: resource(resources::RECRUITERS, &api, &checker, config),
            role_assignments: RoleAssignments::new(
                api.clone(),
                checker.clone(),
                config.cache.policy_for(resources::role_assignments::KEY),
                config.auth.enforce_api_rbac,
            ),
            auth: AuthApi::new(api.clone()),
            events,
            session,
            checker,
            guard,
            api,
        };

        info!(base_url = %config.api.base_url, "HRMS client ready");
        Ok(client)
    }

    /// The event bus; subscribe to see logouts and notices.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// The session manager.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// The access checker.
    pub fn checker(&self) -> &AccessChecker {
        &self.checker
    }

    /// The route guard.
    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    /// The raw authenticated client.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Auth endpoints.
    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }
}
