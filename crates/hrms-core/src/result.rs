//! Convenience result type alias for the HRMS console.

use crate::error::AppError;

/// A specialized `Result` type for HRMS console operations.
pub type AppResult<T> = Result<T, AppError>;
