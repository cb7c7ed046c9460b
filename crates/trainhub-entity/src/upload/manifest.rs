//! Summary returned by an upload call.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One stored file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Generated file name.
    pub name: String,
    /// Public URL.
    pub url: String,
    /// Category, or `model` for the model artifact.
    pub label: String,
    /// File record ID.
    pub docname: Uuid,
    /// Decoded size in bytes.
    pub size_bytes: i64,
}

/// Details of the stored model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFileInfo {
    /// Generated file name.
    pub name: String,
    /// Name supplied by the caller.
    pub original_name: String,
    /// Public URL.
    pub url: String,
    /// File record ID.
    pub docname: Uuid,
}

/// A data file that was left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedEntry {
    /// Zero-based position in the request.
    pub index: usize,
    /// Category as normalized from the request.
    pub category: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadManifest {
    /// Human-readable status message.
    pub message: String,
    /// Every stored file, model included.
    pub files: Vec<UploadedFile>,
    /// Project name.
    pub project: String,
    /// Number of stored files.
    pub count: usize,
    /// URL of the project folder.
    pub folder_path: String,
    /// Model artifact details, when one was stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_file: Option<ModelFileInfo>,
    /// Entries left out because of an unknown category.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedEntry>,
}

impl UploadManifest {
    /// Status message for an upload with or without a model artifact.
    pub fn status_message(with_model: bool, model_extension: &str) -> String {
        let mut message = String::from("Training data");
        if with_model {
            message.push_str(&format!(" and model file (.{model_extension})"));
        }
        message.push_str(" uploaded successfully.");
        message
    }

    /// Files stored under the given label.
    pub fn files_labelled<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a UploadedFile> {
        self.files.iter().filter(move |f| f.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        assert_eq!(
            UploadManifest::status_message(false, "h5"),
            "Training data uploaded successfully."
        );
        assert_eq!(
            UploadManifest::status_message(true, "h5"),
            "Training data and model file (.h5) uploaded successfully."
        );
    }

    #[test]
    fn test_optional_sections_are_omitted() {
        let manifest = UploadManifest {
            message: "ok".into(),
            files: Vec::new(),
            project: "alpha".into(),
            count: 0,
            folder_path: "/app/file/Home/training_data/alpha".into(),
            model_file: None,
            skipped: Vec::new(),
        };
        let value = serde_json::to_value(&manifest).expect("serialize");
        assert!(value.get("model_file").is_none());
        assert!(value.get("skipped").is_none());
    }
}
