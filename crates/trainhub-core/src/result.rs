//! Convenience result type alias for TrainHub.

use crate::error::AppError;

/// A specialized `Result` type for TrainHub operations.
pub type AppResult<T> = Result<T, AppError>;
