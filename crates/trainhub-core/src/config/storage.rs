//! Storage provider configuration.

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage provider to use. Only `"local"` ships with TrainHub.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Root directory that folder paths (`Home/...`) are resolved against.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Maximum accepted HTTP request body in bytes (base64 inflates payloads by a third).
    #[serde(default = "default_max_request")]
    pub max_request_size_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            root_path: default_root_path(),
            max_request_size_bytes: default_max_request(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_root_path() -> String {
    "./data/private/files".to_string()
}

fn default_max_request() -> u64 {
    734_003_200 // 700 MB
}
