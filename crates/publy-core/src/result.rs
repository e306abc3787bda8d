//! Convenience result type alias for Publy.

use crate::error::AppError;

/// A specialized `Result` type for Publy operations.
pub type AppResult<T> = Result<T, AppError>;
