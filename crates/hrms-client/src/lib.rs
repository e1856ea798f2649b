//! # hrms-client
//!
//! The layer every screen talks to. [`http::ApiClient`] attaches a valid
//! bearer token to each request and recovers from 401 responses by
//! renewing and retrying; [`resources`] wraps each REST resource with a
//! cached read and cache-invalidating writes; [`app::HrmsClient`] wires it
//! all together from configuration.

pub mod app;
pub mod auth;
pub mod dto;
pub mod http;
pub mod resources;

pub use app::HrmsClient;
pub use auth::{AuthApi, HttpTokenRenewer};
pub use http::ApiClient;
pub use resources::{Resource, ResourceSpec, RoleAssignments};
