//! Upload layout and limits.
//!
//! Uploaded files land under `Home/<root_folder>/<project>/<category>` and
//! model artifacts under `Home/<root_folder>/<project>/<model_folder>`.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// What to do with a data file whose category is not configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnknownCategoryPolicy {
    /// Leave the entry out and report it in the manifest.
    #[default]
    Skip,
    /// Fail the whole upload.
    Reject,
}

/// Upload configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Top-level folder under `Home` that holds every project.
    #[serde(default = "default_root_folder")]
    pub root_folder: String,
    /// Per-project folder receiving the model artifact.
    #[serde(default = "default_model_folder")]
    pub model_folder: String,
    /// Category folders created under every project (lower-case).
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    /// Handling of entries with an unconfigured category.
    #[serde(default)]
    pub unknown_category: UnknownCategoryPolicy,
    /// Extension used when neither the entry name nor the content reveals one.
    #[serde(default = "default_extension")]
    pub default_extension: String,
    /// Extension forced onto every model artifact.
    #[serde(default = "default_model_extension")]
    pub model_extension: String,
    /// Maximum number of data files per call.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Maximum decoded bytes per call, model included.
    #[serde(default = "default_max_total_bytes")]
    pub max_total_bytes: u64,
    /// Prefix prepended to storage paths to build file URLs.
    #[serde(default = "default_file_url_prefix")]
    pub file_url_prefix: String,
    /// Prefix prepended to folder paths in the manifest.
    #[serde(default = "default_folder_url_prefix")]
    pub folder_url_prefix: String,
    /// Whether created folders and files are marked private.
    #[serde(default = "default_true")]
    pub private_files: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            root_folder: default_root_folder(),
            model_folder: default_model_folder(),
            categories: default_categories(),
            unknown_category: UnknownCategoryPolicy::default(),
            default_extension: default_extension(),
            model_extension: default_model_extension(),
            max_entries: default_max_entries(),
            max_total_bytes: default_max_total_bytes(),
            file_url_prefix: default_file_url_prefix(),
            folder_url_prefix: default_folder_url_prefix(),
            private_files: default_true(),
        }
    }
}

impl UploadConfig {
    /// Reject layouts that would make two folders collide.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.categories.is_empty() {
            return Err(AppError::configuration(
                "upload.categories must contain at least one category",
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for category in &self.categories {
            let normalized = category.trim().to_lowercase();
            if normalized.is_empty() {
                return Err(AppError::configuration("upload.categories contains an empty name"));
            }
            if normalized == self.model_folder.trim().to_lowercase() {
                return Err(AppError::configuration(format!(
                    "upload category '{category}' collides with the model folder"
                )));
            }
            if !seen.insert(normalized) {
                return Err(AppError::configuration(format!(
                    "upload category '{category}' is listed twice"
                )));
            }
        }

        for (key, value) in [
            ("upload.root_folder", &self.root_folder),
            ("upload.model_folder", &self.model_folder),
            ("upload.default_extension", &self.default_extension),
            ("upload.model_extension", &self.model_extension),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::configuration(format!("{key} must not be empty")));
            }
        }

        if self.max_entries == 0 {
            return Err(AppError::configuration("upload.max_entries must be positive"));
        }

        Ok(())
    }

    /// The configured categories, lower-cased.
    pub fn normalized_categories(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| c.trim().to_lowercase())
            .collect()
    }
}

fn default_root_folder() -> String {
    "training_data".to_string()
}

fn default_model_folder() -> String {
    "model".to_string()
}

fn default_categories() -> Vec<String> {
    vec!["ok".to_string(), "defective".to_string()]
}

fn default_extension() -> String {
    "png".to_string()
}

fn default_model_extension() -> String {
    "h5".to_string()
}

fn default_max_entries() -> usize {
    1000
}

fn default_max_total_bytes() -> u64 {
    536_870_912 // 512 MB
}

fn default_file_url_prefix() -> String {
    "/private/files".to_string()
}

fn default_folder_url_prefix() -> String {
    "/app/file".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_colliding_with_model_folder() {
        let config = UploadConfig {
            categories: vec!["ok".into(), "Model".into()],
            ..UploadConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.message.contains("collides"));
    }

    #[test]
    fn test_duplicate_category() {
        let config = UploadConfig {
            categories: vec!["ok".into(), " OK ".into()],
            ..UploadConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_normalized_categories() {
        let config = UploadConfig {
            categories: vec!["Images".into(), " documents".into()],
            ..UploadConfig::default()
        };
        assert_eq!(config.normalized_categories(), vec!["images", "documents"]);
    }
}
