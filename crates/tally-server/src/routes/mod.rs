pub mod health;
pub mod stats;
pub mod track;

use crate::error::AppError;

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("No such route".to_string())
}
