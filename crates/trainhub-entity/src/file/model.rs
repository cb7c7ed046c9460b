//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A file record. The bytes live in the storage provider at `storage_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// The folder containing this file.
    pub folder_id: Uuid,
    /// The file name (including extension).
    pub name: String,
    /// The path within the storage provider.
    pub storage_path: String,
    /// Public URL of the file.
    pub file_url: String,
    /// MIME type of the file.
    pub mime_type: Option<String>,
    /// File size in bytes.
    pub size_bytes: i64,
    /// SHA-256 checksum of the file content (lower-case hex).
    pub content_hash: String,
    /// Category the file was uploaded under (`model` for model artifacts).
    pub category: String,
    /// Name supplied by the caller, if any.
    pub original_name: Option<String>,
    /// Whether the file is private.
    pub is_private: bool,
    /// Entity type the file is attached to.
    pub attached_to_type: Option<String>,
    /// Entity name the file is attached to.
    pub attached_to_name: Option<String>,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// The folder to place the file in.
    pub folder_id: Uuid,
    /// The file name.
    pub name: String,
    /// The path within the storage provider.
    pub storage_path: String,
    /// Public URL of the file.
    pub file_url: String,
    /// MIME type.
    pub mime_type: Option<String>,
    /// File size in bytes.
    pub size_bytes: i64,
    /// SHA-256 checksum.
    pub content_hash: String,
    /// Upload category.
    pub category: String,
    /// Name supplied by the caller.
    pub original_name: Option<String>,
    /// Whether the file is private.
    pub is_private: bool,
    /// Entity type the file is attached to.
    pub attached_to_type: Option<String>,
    /// Entity name the file is attached to.
    pub attached_to_name: Option<String>,
}
