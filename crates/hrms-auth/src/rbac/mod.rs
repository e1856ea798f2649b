//! Role-based access control: the static table and the checks against it.

pub mod checker;
pub mod matcher;
pub mod policies;

pub use checker::AccessChecker;
pub use matcher::PathTemplate;
pub use policies::{Action, MenuItem, RbacPolicies, RouteRule};
