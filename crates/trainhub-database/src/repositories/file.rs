//! File repository implementation.

use sqlx::PgConnection;
use uuid::Uuid;

use trainhub_core::error::{AppError, ErrorKind};
use trainhub_core::result::AppResult;
use trainhub_entity::file::{CreateFile, File};

/// Unique constraint guarding (folder_id, name).
const FOLDER_NAME_KEY: &str = "files_folder_id_name_key";

/// File record queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRepository;

impl FileRepository {
    /// Check whether a file name is already used in a folder.
    pub async fn name_exists(
        conn: &mut PgConnection,
        folder_id: Uuid,
        name: &str,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM files WHERE folder_id = $1 AND name = $2)",
        )
        .bind(folder_id)
        .bind(name)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check file name", e))
    }

    /// Insert a file record.
    pub async fn create(conn: &mut PgConnection, data: &CreateFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files \
             (folder_id, name, storage_path, file_url, mime_type, size_bytes, content_hash, \
              category, original_name, is_private, attached_to_type, attached_to_name) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
        )
        .bind(data.folder_id)
        .bind(&data.name)
        .bind(&data.storage_path)
        .bind(&data.file_url)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .bind(&data.content_hash)
        .bind(&data.category)
        .bind(&data.original_name)
        .bind(data.is_private)
        .bind(&data.attached_to_type)
        .bind(&data.attached_to_name)
        .fetch_one(conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(FOLDER_NAME_KEY) => {
                AppError::conflict(format!("File '{}' already exists", data.storage_path))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create file record", e),
        })
    }
}
