//! PostgreSQL-backed document store.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use trainhub_core::error::{AppError, ErrorKind};
use trainhub_core::result::AppResult;
use trainhub_entity::file::{CreateFile, File};
use trainhub_entity::folder::{CreateFolder, Folder};

use super::{DocumentStore, DocumentTransaction};
use crate::repositories::{FileRepository, FolderRepository, ProjectRepository};

/// Document store running every unit of work in a database transaction.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Wrap an open pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn backend(&self) -> &str {
        "postgres"
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| true)
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Database health check failed", e)
            })
    }

    async fn begin(&self) -> AppResult<Box<dyn DocumentTransaction>> {
        let tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        Ok(Box::new(PgDocumentTransaction { tx: Some(tx) }))
    }
}

/// An open PostgreSQL transaction. `None` once committed or rolled back.
pub struct PgDocumentTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgDocumentTransaction {
    fn conn(&mut self) -> AppResult<&mut PgConnection> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| AppError::database("Transaction already finished"))
    }
}

#[async_trait]
impl DocumentTransaction for PgDocumentTransaction {
    async fn project_exists(&mut self, name: &str) -> AppResult<bool> {
        ProjectRepository::exists(self.conn()?, name).await
    }

    async fn find_folder(
        &mut self,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<Folder>> {
        FolderRepository::find_by_name(self.conn()?, parent_id, name).await
    }

    async fn create_folder(&mut self, data: &CreateFolder) -> AppResult<Folder> {
        FolderRepository::create(self.conn()?, data).await
    }

    async fn file_name_taken(&mut self, folder_id: Uuid, name: &str) -> AppResult<bool> {
        FileRepository::name_exists(self.conn()?, folder_id, name).await
    }

    async fn create_file(&mut self, data: &CreateFile) -> AppResult<File> {
        FileRepository::create(self.conn()?, data).await
    }

    async fn commit(&mut self) -> AppResult<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| AppError::database("Transaction already finished"))?;
        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })
    }

    async fn rollback(&mut self) -> AppResult<()> {
        match self.tx.take() {
            Some(tx) => tx.rollback().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to roll back transaction", e)
            }),
            None => Ok(()),
        }
    }
}
