//! # trainhub-storage
//!
//! Blob storage for uploaded training data. Paths handed to a provider
//! mirror the folder hierarchy (`Home/<root>/<project>/<category>/<file>`).

pub mod providers;

use std::sync::Arc;

use trainhub_core::config::StorageConfig;
use trainhub_core::error::AppError;
use trainhub_core::result::AppResult;
use trainhub_core::traits::StorageProvider;

pub use providers::local::{LocalStorageProvider, mime_from_path};

/// Build the provider selected by `storage.provider`.
pub async fn connect_storage(config: &StorageConfig) -> AppResult<Arc<dyn StorageProvider>> {
    match config.provider.as_str() {
        "local" => Ok(Arc::new(LocalStorageProvider::new(&config.root_path).await?)),
        other => Err(AppError::configuration(format!(
            "Unsupported storage provider: {other}"
        ))),
    }
}
