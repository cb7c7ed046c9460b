//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use trainhub_core::config::AppConfig;
use trainhub_core::traits::StorageProvider;
use trainhub_database::DocumentStore;
use trainhub_service::UploadService;

/// Shared dependencies, cloned into every handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Project, folder, and file records
    pub store: Arc<dyn DocumentStore>,
    /// Blob storage
    pub storage: Arc<dyn StorageProvider>,
    /// Upload orchestration
    pub upload_service: Arc<UploadService>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Wire the services on top of a store and a storage provider.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn StorageProvider>,
    ) -> Self {
        let upload_service = Arc::new(UploadService::new(
            Arc::clone(&store),
            Arc::clone(&storage),
            config.upload.clone(),
        ));
        Self {
            config: Arc::new(config),
            store,
            storage,
            upload_service,
            started_at: Instant::now(),
        }
    }
}
