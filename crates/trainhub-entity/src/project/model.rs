//! Project entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An externally managed project. TrainHub only checks that it exists.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    /// Unique project name.
    pub name: String,
    /// Optional human-readable title.
    pub title: Option<String>,
    /// When the project was registered.
    pub created_at: DateTime<Utc>,
}
