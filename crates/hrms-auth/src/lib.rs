//! # hrms-auth
//!
//! Client-side session and authorization layer for the HRMS console.
//!
//! ## Modules
//!
//! - `jwt`: token claim decoding and expiry checks (no signature verification)
//! - `session`: token stores and the session manager (renewal, logout)
//! - `rbac`: the static access-control table, path templates, access checks
//! - `guard`: per-navigation route guard

pub mod guard;
pub mod jwt;
pub mod rbac;
pub mod session;

pub use guard::{GuardDecision, GuardState, RouteGuard};
pub use jwt::{TokenClaims, TokenValidator};
pub use rbac::{AccessChecker, Action, MenuItem, PathTemplate, RbacPolicies};
pub use session::{
    FileTokenStore, MemoryTokenStore, RenewalAttempt, SessionManager, StorageKey, TokenRenewer,
    TokenStore,
};
