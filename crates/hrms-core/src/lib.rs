//! # hrms-core
//!
//! Core crate for the HRMS console. Contains configuration schemas,
//! the unified error system, and the session/notice event bus that the
//! presentation layer subscribes to.
//!
//! This crate has **no** internal dependencies on other HRMS crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use events::{ConsoleEvent, EventBus};
pub use result::AppResult;
