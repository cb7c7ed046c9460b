//! Process-local document store.
//!
//! A transaction holds the store lock for its whole lifetime and works on a
//! staged copy, so transactions are serialized and commit is a swap.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use trainhub_core::error::AppError;
use trainhub_core::result::AppResult;
use trainhub_entity::file::{CreateFile, File};
use trainhub_entity::folder::{CreateFolder, Folder};

use super::{DocumentStore, DocumentTransaction};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    projects: BTreeSet<String>,
    folders: HashMap<Uuid, Folder>,
    files: HashMap<Uuid, File>,
}

/// In-memory document store.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDocumentStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with the given projects already registered.
    pub fn with_projects<I, S>(projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = MemoryState {
            projects: projects.into_iter().map(Into::into).collect(),
            ..MemoryState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Snapshot of committed folders, ordered by path.
    pub async fn folders(&self) -> Vec<Folder> {
        let mut folders: Vec<Folder> = self.state.lock().await.folders.values().cloned().collect();
        folders.sort_by(|a, b| a.path.cmp(&b.path));
        folders
    }

    /// Snapshot of committed file records, ordered by storage path.
    pub async fn files(&self) -> Vec<File> {
        let mut files: Vec<File> = self.state.lock().await.files.values().cloned().collect();
        files.sort_by(|a, b| a.storage_path.cmp(&b.storage_path));
        files
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn backend(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn begin(&self) -> AppResult<Box<dyn DocumentTransaction>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTransaction {
            guard: Some(guard),
            staged,
        }))
    }
}

struct MemoryTransaction {
    guard: Option<OwnedMutexGuard<MemoryState>>,
    staged: MemoryState,
}

impl MemoryTransaction {
    fn ensure_open(&self) -> AppResult<()> {
        match self.guard {
            Some(_) => Ok(()),
            None => Err(AppError::database("Transaction already finished")),
        }
    }
}

#[async_trait]
impl DocumentTransaction for MemoryTransaction {
    async fn project_exists(&mut self, name: &str) -> AppResult<bool> {
        self.ensure_open()?;
        Ok(self.staged.projects.contains(name))
    }

    async fn find_folder(
        &mut self,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<Folder>> {
        self.ensure_open()?;
        Ok(self
            .staged
            .folders
            .values()
            .find(|f| f.parent_id == parent_id && f.name == name)
            .cloned())
    }

    async fn create_folder(&mut self, data: &CreateFolder) -> AppResult<Folder> {
        self.ensure_open()?;
        if let Some(parent_id) = data.parent_id {
            if !self.staged.folders.contains_key(&parent_id) {
                return Err(AppError::database(format!(
                    "Parent folder {parent_id} does not exist"
                )));
            }
        }
        let duplicate = self
            .staged
            .folders
            .values()
            .any(|f| f.parent_id == data.parent_id && f.name == data.name);
        if duplicate {
            return Err(AppError::conflict(format!(
                "Folder '{}' already exists",
                data.path
            )));
        }

        let now = Utc::now();
        let folder = Folder {
            id: Uuid::new_v4(),
            parent_id: data.parent_id,
            name: data.name.clone(),
            path: data.path.clone(),
            depth: data.depth,
            is_private: data.is_private,
            attached_to_type: data.attached_to_type.clone(),
            attached_to_name: data.attached_to_name.clone(),
            created_at: now,
            updated_at: now,
        };
        self.staged.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn file_name_taken(&mut self, folder_id: Uuid, name: &str) -> AppResult<bool> {
        self.ensure_open()?;
        Ok(self
            .staged
            .files
            .values()
            .any(|f| f.folder_id == folder_id && f.name == name))
    }

    async fn create_file(&mut self, data: &CreateFile) -> AppResult<File> {
        self.ensure_open()?;
        if !self.staged.folders.contains_key(&data.folder_id) {
            return Err(AppError::database(format!(
                "Folder {} does not exist",
                data.folder_id
            )));
        }
        if self.file_name_taken(data.folder_id, &data.name).await? {
            return Err(AppError::conflict(format!(
                "File '{}' already exists",
                data.storage_path
            )));
        }

        let file = File {
            id: Uuid::new_v4(),
            folder_id: data.folder_id,
            name: data.name.clone(),
            storage_path: data.storage_path.clone(),
            file_url: data.file_url.clone(),
            mime_type: data.mime_type.clone(),
            size_bytes: data.size_bytes,
            content_hash: data.content_hash.clone(),
            category: data.category.clone(),
            original_name: data.original_name.clone(),
            is_private: data.is_private,
            attached_to_type: data.attached_to_type.clone(),
            attached_to_name: data.attached_to_name.clone(),
            created_at: Utc::now(),
        };
        self.staged.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn commit(&mut self) -> AppResult<()> {
        let mut guard = self
            .guard
            .take()
            .ok_or_else(|| AppError::database("Transaction already finished"))?;
        *guard = std::mem::take(&mut self.staged);
        Ok(())
    }

    async fn rollback(&mut self) -> AppResult<()> {
        self.guard = None;
        self.staged = MemoryState::default();
        Ok(())
    }
}
