//! Transactional document store abstraction.
//!
//! Every upload runs inside one [`DocumentTransaction`]. Either all of its
//! folder and file records become visible on [`DocumentTransaction::commit`]
//! or none do.

pub mod memory;
pub mod postgres;

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use trainhub_core::config::{DatabaseConfig, DatabaseProvider};
use trainhub_core::result::AppResult;
use trainhub_entity::file::{CreateFile, File};
use trainhub_entity::folder::{CreateFolder, Folder};

use crate::connection::DatabasePool;
use crate::migration::run_migrations;

use self::memory::MemoryDocumentStore;
use self::postgres::PgDocumentStore;

/// A backend holding projects, folders, and file records.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug + 'static {
    /// Short backend name (`postgres`, `memory`).
    fn backend(&self) -> &str;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Open a unit of work.
    async fn begin(&self) -> AppResult<Box<dyn DocumentTransaction>>;
}

/// A unit of work against a [`DocumentStore`].
///
/// Dropping an unfinished transaction discards its writes.
#[async_trait]
pub trait DocumentTransaction: Send {
    /// Whether a project with this exact name exists.
    async fn project_exists(&mut self, name: &str) -> AppResult<bool>;

    /// Find a folder by name under `parent_id` (`None` = under `Home`).
    async fn find_folder(&mut self, parent_id: Option<Uuid>, name: &str)
    -> AppResult<Option<Folder>>;

    /// Insert a folder. A sibling with the same name yields a conflict.
    async fn create_folder(&mut self, data: &CreateFolder) -> AppResult<Folder>;

    /// Whether `name` is already used by a file in the folder.
    async fn file_name_taken(&mut self, folder_id: Uuid, name: &str) -> AppResult<bool>;

    /// Insert a file record.
    async fn create_file(&mut self, data: &CreateFile) -> AppResult<File>;

    /// Make every write of this transaction visible.
    async fn commit(&mut self) -> AppResult<()>;

    /// Discard every write of this transaction. Safe to call twice.
    async fn rollback(&mut self) -> AppResult<()>;
}

/// Build the store selected by `database.provider`.
pub async fn connect_store(config: &DatabaseConfig) -> AppResult<Arc<dyn DocumentStore>> {
    match config.provider {
        DatabaseProvider::Memory => {
            let store = MemoryDocumentStore::with_projects(config.seed_projects.iter().cloned());
            info!(
                projects = config.seed_projects.len(),
                "Using in-memory document store"
            );
            Ok(Arc::new(store))
        }
        DatabaseProvider::Postgres => {
            let pool = DatabasePool::connect(config).await?;
            if config.run_migrations {
                run_migrations(pool.pool()).await?;
            }
            Ok(Arc::new(PgDocumentStore::new(pool.into_pool())))
        }
    }
}
