//! Per-navigation route guard.
//!
//! Every navigation is evaluated from scratch; nothing is cached between
//! route changes.

use serde::Serialize;
use tracing::{debug, info};

use hrms_core::config::AuthConfig;
use hrms_core::events::LogoutReason;
use hrms_entity::Role;

use crate::rbac::AccessChecker;
use crate::rbac::checker::strip_query;
use crate::session::SessionManager;

/// Where a navigation ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    /// No usable session.
    Unauthenticated,
    /// Session present and the role may open the route.
    AuthenticatedAuthorized,
    /// Session present but the role may not open the route.
    AuthenticatedUnauthorized,
}

/// Outcome of one navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    /// A public route; rendered without looking at the session.
    Public {
        /// Requested path.
        path: String,
    },
    /// Render the requested route.
    Authorized {
        /// Requested path.
        path: String,
        /// Role the decision was made for.
        role: Option<Role>,
    },
    /// Redirect to the unauthorized page.
    Unauthorized {
        /// Requested path.
        from: String,
        /// Redirect target.
        redirect_to: String,
    },
    /// Redirect to login, remembering where the user wanted to go.
    Unauthenticated {
        /// Requested path, kept for the post-login redirect.
        from: String,
        /// Redirect target.
        redirect_to: String,
    },
}

impl GuardDecision {
    /// State machine state, `None` for public routes.
    pub fn state(&self) -> Option<GuardState> {
        match self {
            Self::Public { .. } => None,
            Self::Authorized { .. } => Some(GuardState::AuthenticatedAuthorized),
            Self::Unauthorized { .. } => Some(GuardState::AuthenticatedUnauthorized),
            Self::Unauthenticated { .. } => Some(GuardState::Unauthenticated),
        }
    }

    /// The route that ends up on screen.
    pub fn destination(&self) -> &str {
        match self {
            Self::Public { path } | Self::Authorized { path, .. } => path,
            Self::Unauthorized { redirect_to, .. } | Self::Unauthenticated { redirect_to, .. } => {
                redirect_to
            }
        }
    }

    /// Returns `true` if the requested route renders.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Public { .. } | Self::Authorized { .. })
    }
}

/// Gates navigation on session validity and the route table.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: SessionManager,
    checker: AccessChecker,
    unauthorized_route: String,
}

impl RouteGuard {
    /// Creates a guard.
    pub fn new(
        session: SessionManager,
        checker: AccessChecker,
        unauthorized_route: impl Into<String>,
    ) -> Self {
        Self {
            session,
            checker,
            unauthorized_route: unauthorized_route.into(),
        }
    }

    /// Creates a guard using the routes from the `[auth]` section.
    pub fn from_config(config: &AuthConfig, session: SessionManager, checker: AccessChecker) -> Self {
        Self::new(session, checker, config.unauthorized_route.clone())
    }

    /// Evaluate a navigation to `path`.
    pub fn navigate(&self, path: &str) -> GuardDecision {
        if self.checker.is_public_route(path) {
            return GuardDecision::Public {
                path: path.to_string(),
            };
        }

        match self.session.access_token() {
            None => {
                if let Err(e) = self.session.clear() {
                    debug!(error = %e, "Could not clear token store");
                }
                return self.to_login(path);
            }
            Some(token) if self.session.validator().is_expired(Some(&token)) => {
                self.session.logout(LogoutReason::TokenExpired);
                return self.to_login(path);
            }
            Some(_) => {}
        }

        let role = self.session.current_role();
        if strip_query(path) == self.unauthorized_route
            || self.checker.has_route_access(path, role)
        {
            debug!(path, role = ?role, "Navigation allowed");
            return GuardDecision::Authorized {
                path: path.to_string(),
                role,
            };
        }

        info!(path, role = ?role, "Navigation denied");
        GuardDecision::Unauthorized {
            from: path.to_string(),
            redirect_to: self.unauthorized_route.clone(),
        }
    }

    fn to_login(&self, path: &str) -> GuardDecision {
        info!(path, "No valid session, redirecting to login");
        GuardDecision::Unauthenticated {
            from: path.to_string(),
            redirect_to: self.session.login_route().to_string(),
        }
    }
}
