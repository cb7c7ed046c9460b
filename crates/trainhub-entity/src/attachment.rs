//! Attachment of a folder or file record to another entity.

use serde::{Deserialize, Serialize};

/// Entity type name used when records are attached to a project.
pub const PROJECT_ENTITY: &str = "Project";

/// Reference from a folder or file record to the entity it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedTo {
    /// Entity type (e.g. `"Project"`).
    pub entity_type: String,
    /// Entity name.
    pub entity_name: String,
}

impl AttachedTo {
    /// Attach to the named project.
    pub fn project(name: impl Into<String>) -> Self {
        Self {
            entity_type: PROJECT_ENTITY.to_string(),
            entity_name: name.into(),
        }
    }
}
