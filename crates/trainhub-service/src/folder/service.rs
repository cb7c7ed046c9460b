//! Ensure-or-create for folder records.

use tracing::info;

use trainhub_core::error::AppError;
use trainhub_core::result::AppResult;
use trainhub_database::DocumentTransaction;
use trainhub_entity::AttachedTo;
use trainhub_entity::folder::{CreateFolder, Folder};

/// A folder returned by [`FolderService::ensure_folder`].
#[derive(Debug, Clone)]
pub struct EnsuredFolder {
    /// The folder record.
    pub folder: Folder,
    /// Whether this call inserted it.
    pub created: bool,
}

/// Looks folders up by (parent, name) and creates the missing ones.
#[derive(Debug, Clone)]
pub struct FolderService {
    private: bool,
}

impl FolderService {
    /// Creates a folder service. New folders get `is_private = private`.
    pub fn new(private: bool) -> Self {
        Self { private }
    }

    /// Return the folder `name` under `parent` (or `Home`), creating it if needed.
    ///
    /// Folders created here are attached to `owner`. Existing folders are
    /// returned as they are, whoever they are attached to.
    pub async fn ensure_folder(
        &self,
        tx: &mut dyn DocumentTransaction,
        parent: Option<&Folder>,
        name: &str,
        owner: &AttachedTo,
    ) -> AppResult<EnsuredFolder> {
        validate_folder_name(name)?;

        let parent_id = parent.map(|p| p.id);
        if let Some(folder) = tx.find_folder(parent_id, name).await? {
            return Ok(EnsuredFolder {
                folder,
                created: false,
            });
        }

        let data = CreateFolder::under(parent, name, Some(owner), self.private);
        let folder = tx.create_folder(&data).await?;

        info!(
            folder_id = %folder.id,
            path = %folder.path,
            attached_to = %owner.entity_name,
            "Folder created"
        );

        Ok(EnsuredFolder {
            folder,
            created: true,
        })
    }
}

/// Folder names become path segments, so separators and dot names are refused.
pub fn validate_folder_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Folder name cannot be empty"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(AppError::validation(format!(
            "Folder name '{name}' must not contain path separators"
        )));
    }
    if name == "." || name == ".." {
        return Err(AppError::validation(format!("Folder name '{name}' is reserved")));
    }
    Ok(())
}
