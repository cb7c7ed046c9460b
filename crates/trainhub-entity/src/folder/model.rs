//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::attachment::AttachedTo;

/// Name of the implicit root every top-level folder hangs off.
pub const HOME_FOLDER: &str = "Home";

/// A folder in the content hierarchy.
///
/// Names are unique per parent only; two projects can both own an `ok`
/// folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// Parent folder ID (null for folders directly under `Home`).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// Full materialized path (e.g., `Home/training_data/alpha/ok`).
    pub path: String,
    /// Depth below `Home` (0 for top-level folders).
    pub depth: i32,
    /// Whether the folder is private.
    pub is_private: bool,
    /// Entity type the folder is attached to.
    pub attached_to_type: Option<String>,
    /// Entity name the folder is attached to.
    pub attached_to_name: Option<String>,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Path of a child named `name`.
    pub fn child_path(&self, name: &str) -> String {
        format!("{}/{}", self.path, name)
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Parent folder (None for `Home`).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// Full materialized path.
    pub path: String,
    /// Depth in the tree.
    pub depth: i32,
    /// Whether the folder is private.
    pub is_private: bool,
    /// Entity type the folder is attached to.
    pub attached_to_type: Option<String>,
    /// Entity name the folder is attached to.
    pub attached_to_name: Option<String>,
}

impl CreateFolder {
    /// Describe a folder named `name` under `parent` (or `Home`).
    pub fn under(
        parent: Option<&Folder>,
        name: &str,
        attached_to: Option<&AttachedTo>,
        is_private: bool,
    ) -> Self {
        let (path, depth) = match parent {
            Some(parent) => (parent.child_path(name), parent.depth + 1),
            None => (format!("{HOME_FOLDER}/{name}"), 0),
        };

        Self {
            parent_id: parent.map(|p| p.id),
            name: name.to_string(),
            path,
            depth,
            is_private,
            attached_to_type: attached_to.map(|a| a.entity_type.clone()),
            attached_to_name: attached_to.map(|a| a.entity_name.clone()),
        }
    }
}
