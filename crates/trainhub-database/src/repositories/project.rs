//! Project lookups.

use sqlx::PgConnection;

use trainhub_core::error::{AppError, ErrorKind};
use trainhub_core::result::AppResult;

/// Read-only access to externally managed projects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectRepository;

impl ProjectRepository {
    /// Check whether a project with this exact name exists.
    pub async fn exists(conn: &mut PgConnection, name: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM projects WHERE name = $1)")
            .bind(name)
            .fetch_one(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to look up project", e))
    }
}
