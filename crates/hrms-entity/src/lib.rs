//! # hrms-entity
//!
//! Domain models for the HRMS console. Every struct here mirrors a JSON
//! shape exchanged with the backend. Records derive `Deserialize`; the
//! `New*` drafts derive `Serialize` and `Validate` so they can be checked
//! before a write request is sent.

pub mod client;
pub mod department;
pub mod employee;
pub mod id;
pub mod job_role;
pub mod role;
pub mod role_assignment;
pub mod salary;
pub mod session;
pub mod staff;

pub use id::EntityId;
pub use role::Role;
pub use session::Session;
