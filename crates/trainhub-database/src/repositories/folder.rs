//! Folder repository implementation.

use sqlx::PgConnection;
use uuid::Uuid;

use trainhub_core::error::{AppError, ErrorKind};
use trainhub_core::result::AppResult;
use trainhub_entity::folder::{CreateFolder, Folder};

/// Unique constraint guarding (parent_id, name).
const PARENT_NAME_KEY: &str = "folders_parent_id_name_key";

/// Folder queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderRepository;

impl FolderRepository {
    /// Find a folder by name under a parent (`None` = under `Home`).
    pub async fn find_by_name(
        conn: &mut PgConnection,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE parent_id IS NOT DISTINCT FROM $1 AND name = $2",
        )
        .bind(parent_id)
        .bind(name)
        .fetch_optional(conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find folder by name", e)
        })
    }

    /// Create a new folder.
    pub async fn create(conn: &mut PgConnection, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders \
             (parent_id, name, path, depth, is_private, attached_to_type, attached_to_name) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(&data.path)
        .bind(data.depth)
        .bind(data.is_private)
        .bind(&data.attached_to_type)
        .bind(&data.attached_to_name)
        .fetch_one(conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(PARENT_NAME_KEY) => {
                AppError::conflict(format!("Folder '{}' already exists", data.path))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create folder", e),
        })
    }
}
