//! Upload request shapes.
//!
//! Field aliases accept the older callable's names (`training_data`,
//! `image`, `label`, `file_data`, `file_name`).

use serde::{Deserialize, Serialize};

/// One base64-encoded data file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFileEntry {
    /// Base64 content, optionally prefixed with a `data:` URL header.
    #[serde(default, alias = "image", alias = "file_data")]
    pub content: Option<String>,
    /// Category (label) selecting the target folder.
    #[serde(default, alias = "label")]
    pub category: Option<String>,
    /// Original file name, used for the extension only.
    #[serde(default, alias = "file_name")]
    pub name: Option<String>,
}

impl DataFileEntry {
    /// Build an entry from already-encoded content.
    pub fn new(content: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            category: Some(category.into()),
            name: None,
        }
    }

    /// Attach the original file name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// The optional serialized model artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelFileEntry {
    /// Base64 content, optionally prefixed with a `data:` URL header.
    #[serde(default, alias = "file_data")]
    pub content: Option<String>,
    /// Original file name.
    #[serde(default, alias = "file_name")]
    pub name: Option<String>,
}

impl ModelFileEntry {
    /// Build a model entry from already-encoded content.
    pub fn new(content: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            name: Some(name.into()),
        }
    }

    /// Both content and name are present and non-blank.
    pub fn is_complete(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.content) && present(&self.name)
    }
}

/// A complete upload call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadRequest {
    /// Name of an existing project.
    pub project_name: String,
    /// Data files to store under category folders.
    #[serde(default, alias = "training_data")]
    pub data_files: Vec<DataFileEntry>,
    /// Optional model artifact.
    #[serde(default)]
    pub model_file: Option<ModelFileEntry>,
}
