//! Upload orchestration.
//!
//! One call runs in one document transaction. Blobs and directories written
//! along the way are journalled so a failure can remove them again after
//! the transaction is rolled back. Each call runs on its own task, so a
//! caller that stops waiting cannot interrupt the rollback.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use trainhub_core::config::{UnknownCategoryPolicy, UploadConfig};
use trainhub_core::error::{AppError, ErrorKind};
use trainhub_core::result::AppResult;
use trainhub_core::traits::StorageProvider;
use trainhub_database::{DocumentStore, DocumentTransaction};
use trainhub_entity::AttachedTo;
use trainhub_entity::file::{CreateFile, File};
use trainhub_entity::folder::Folder;
use trainhub_entity::upload::{
    DataFileEntry, ModelFileEntry, ModelFileInfo, SkippedEntry, UploadManifest, UploadRequest,
    UploadedFile,
};
use trainhub_storage::mime_from_path;

use super::decode::{content_hash, decode_content};
use super::naming::{
    entry_file_name, extension_of, model_file_name, short_hash, sniff_extension,
};
use crate::folder::{FolderService, validate_folder_name};

/// Prefix of every upload failure message.
const FAILURE_CONTEXT: &str = "Failed to upload training data";

/// Attempts at drawing a fresh hash when a generated name is taken.
const MAX_NAME_ATTEMPTS: usize = 5;

/// Hash length in data file names.
const ENTRY_HASH_LEN: usize = 6;

/// Hash length in model file names.
const MODEL_HASH_LEN: usize = 8;

/// Validates, decodes, and stores training data for a project.
#[derive(Clone)]
pub struct UploadService {
    store: Arc<dyn DocumentStore>,
    storage: Arc<dyn StorageProvider>,
    folders: FolderService,
    config: UploadConfig,
    categories: Vec<String>,
    tasks: TaskTracker,
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService")
            .field("store", &self.store.backend())
            .field("storage", &self.storage.provider_type())
            .field("categories", &self.categories)
            .field("in_flight", &self.tasks.len())
            .finish()
    }
}

/// A data file that passed validation.
#[derive(Debug)]
struct PreparedEntry {
    index: usize,
    category: String,
    data: Bytes,
    extension: String,
    original_name: Option<String>,
}

#[derive(Debug)]
struct PreparedModel {
    data: Bytes,
    original_name: String,
}

#[derive(Debug, Default)]
struct PreparedUpload {
    entries: Vec<PreparedEntry>,
    skipped: Vec<SkippedEntry>,
    model: Option<PreparedModel>,
}

/// The folders of one project.
struct ProjectLayout {
    project: Folder,
    categories: HashMap<String, Folder>,
    model: Folder,
}

/// Side effects outside the document store, in creation order.
#[derive(Debug, Default)]
struct Journal {
    directories: Vec<String>,
    blobs: Vec<String>,
}

impl Journal {
    /// Delete journalled blobs, then remove journalled directories newest first.
    async fn unwind(self, storage: &dyn StorageProvider) {
        for path in self.blobs.iter().rev() {
            if let Err(e) = storage.delete(path).await {
                warn!(path = %path, error = %e, "Failed to delete blob during rollback");
            }
        }
        for path in self.directories.iter().rev() {
            match storage.remove_empty_dir(path).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!(path = %path, "Directory not empty, left in place during rollback")
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "Failed to remove directory during rollback")
                }
            }
        }
    }
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn StorageProvider>,
        config: UploadConfig,
    ) -> Self {
        let categories = config.normalized_categories();
        Self {
            store,
            storage,
            folders: FolderService::new(config.private_files),
            config,
            categories,
            tasks: TaskTracker::new(),
        }
    }

    /// Store every data file (and the model, if complete) for `request.project_name`.
    ///
    /// Nothing is left behind when this fails: the transaction is rolled
    /// back and blobs and directories created by the call are removed. The
    /// work runs on a tracked task, so dropping the returned future lets the
    /// call finish (or unwind) in the background.
    pub async fn upload(&self, request: UploadRequest) -> AppResult<UploadManifest> {
        if self.tasks.is_closed() {
            return Err(AppError::service_unavailable(format!(
                "{FAILURE_CONTEXT}: server is shutting down"
            )));
        }

        let service = self.clone();
        let handle = self.tasks.spawn(async move { service.upload_to_end(request).await });
        match handle.await {
            Ok(result) => result,
            Err(e) => Err(AppError::with_source(
                ErrorKind::Internal,
                format!("{FAILURE_CONTEXT}: upload task aborted"),
                e,
            )),
        }
    }

    /// Refuse new uploads and wait for the running ones to commit or unwind.
    pub async fn drain(&self) {
        self.tasks.close();
        if !self.tasks.is_empty() {
            info!(in_flight = self.tasks.len(), "Waiting for uploads to finish");
        }
        self.tasks.wait().await;
    }

    async fn upload_to_end(&self, request: UploadRequest) -> AppResult<UploadManifest> {
        let project = request.project_name.clone();
        info!(
            project = %project,
            entries = request.data_files.len(),
            with_model = request.model_file.is_some(),
            "Upload started"
        );

        let mut tx = self
            .store
            .begin()
            .await
            .map_err(|e| e.context(FAILURE_CONTEXT))?;
        let mut journal = Journal::default();

        let outcome = match self.run(tx.as_mut(), &mut journal, request).await {
            Ok(manifest) => tx.commit().await.map(|()| manifest),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(manifest) => {
                info!(
                    project = %project,
                    count = manifest.count,
                    skipped = manifest.skipped.len(),
                    "Upload completed"
                );
                Ok(manifest)
            }
            Err(e) => {
                error!(project = %project, error = %e, "Upload failed, rolling back");
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Transaction rollback failed");
                }
                journal.unwind(self.storage.as_ref()).await;
                Err(e.context(FAILURE_CONTEXT))
            }
        }
    }

    async fn run(
        &self,
        tx: &mut dyn DocumentTransaction,
        journal: &mut Journal,
        request: UploadRequest,
    ) -> AppResult<UploadManifest> {
        let project = request.project_name.as_str();
        if project.trim().is_empty() {
            return Err(AppError::validation("project_name is required"));
        }
        if !tx.project_exists(project).await? {
            return Err(AppError::not_found(format!(
                "Project '{project}' does not exist."
            )));
        }
        validate_folder_name(project)?;

        let prepared = self.prepare(&request.data_files, request.model_file.as_ref())?;
        let owner = AttachedTo::project(project);
        let layout = self.ensure_layout(tx, journal, &owner).await?;

        let mut files = Vec::with_capacity(prepared.entries.len() + 1);
        for entry in &prepared.entries {
            let folder = layout.categories.get(&entry.category).ok_or_else(|| {
                AppError::internal(format!("No folder for category '{}'", entry.category))
            })?;
            let record = self
                .store_file(
                    tx,
                    journal,
                    folder,
                    &owner,
                    || {
                        entry_file_name(
                            project,
                            &entry.category,
                            entry.index,
                            &short_hash(ENTRY_HASH_LEN),
                            &entry.extension,
                        )
                    },
                    &entry.category,
                    entry.data.clone(),
                    entry.original_name.clone(),
                )
                .await?;
            files.push(uploaded(&record, &entry.category));
        }

        let mut model_file = None;
        if let Some(model) = &prepared.model {
            let model_extension = self.config.model_extension.trim().to_ascii_lowercase();
            let record = self
                .store_file(
                    tx,
                    journal,
                    &layout.model,
                    &owner,
                    || model_file_name(project, &short_hash(MODEL_HASH_LEN), &model_extension),
                    &self.config.model_folder,
                    model.data.clone(),
                    Some(model.original_name.clone()),
                )
                .await?;
            model_file = Some(ModelFileInfo {
                name: record.name.clone(),
                original_name: model.original_name.clone(),
                url: record.file_url.clone(),
                docname: record.id,
            });
            files.push(uploaded(&record, &self.config.model_folder));
        }

        Ok(UploadManifest {
            message: UploadManifest::status_message(
                model_file.is_some(),
                &self.config.model_extension,
            ),
            count: files.len(),
            files,
            project: project.to_string(),
            folder_path: format!("{}/{}", self.config.folder_url_prefix, layout.project.path),
            model_file,
            skipped: prepared.skipped,
        })
    }

    /// Validate and decode everything before the first write.
    fn prepare(
        &self,
        entries: &[DataFileEntry],
        model: Option<&ModelFileEntry>,
    ) -> AppResult<PreparedUpload> {
        if entries.len() > self.config.max_entries {
            return Err(AppError::validation(format!(
                "Too many data files: {} (maximum {})",
                entries.len(),
                self.config.max_entries
            )));
        }

        let mut prepared = PreparedUpload::default();
        let mut total_bytes: u64 = 0;

        for (index, entry) in entries.iter().enumerate() {
            let content = non_blank(entry.content.as_deref());
            let category = non_blank(entry.category.as_deref());
            let (Some(content), Some(category)) = (content, category) else {
                return Err(AppError::validation(format!(
                    "Invalid training data format: missing content or category in entry {}",
                    index + 1
                )));
            };

            let category = category.trim().to_lowercase();
            if !self.categories.contains(&category) {
                match self.config.unknown_category {
                    UnknownCategoryPolicy::Skip => {
                        debug!(index, category = %category, "Skipping entry with unknown category");
                        prepared.skipped.push(SkippedEntry {
                            index,
                            category,
                            reason: "unknown category".to_string(),
                        });
                        continue;
                    }
                    UnknownCategoryPolicy::Reject => {
                        return Err(AppError::validation(format!(
                            "Unknown category '{category}' in entry {}",
                            index + 1
                        )));
                    }
                }
            }

            let data = decode_content(content)
                .map_err(|e| e.context(format!("Entry {}", index + 1)))?;
            total_bytes += data.len() as u64;
            self.check_total(total_bytes)?;

            let original_name = non_blank(entry.name.as_deref()).map(str::to_string);
            let extension = original_name
                .as_deref()
                .and_then(extension_of)
                .or_else(|| sniff_extension(&data))
                .unwrap_or_else(|| self.config.default_extension.trim().to_ascii_lowercase());

            prepared.entries.push(PreparedEntry {
                index,
                category,
                data,
                extension,
                original_name,
            });
        }

        match model {
            Some(model) if model.is_complete() => {
                let content = model.content.as_deref().unwrap_or_default();
                let data = decode_content(content).map_err(|e| e.context("Model file"))?;
                total_bytes += data.len() as u64;
                self.check_total(total_bytes)?;
                prepared.model = Some(PreparedModel {
                    data,
                    original_name: model.name.clone().unwrap_or_default(),
                });
            }
            Some(_) => warn!("Ignoring model file without both content and name"),
            None => {}
        }

        Ok(prepared)
    }

    fn check_total(&self, total_bytes: u64) -> AppResult<()> {
        if total_bytes > self.config.max_total_bytes {
            return Err(AppError::validation(format!(
                "Upload exceeds the maximum of {} decoded bytes",
                self.config.max_total_bytes
            )));
        }
        Ok(())
    }

    /// `Home/<root>/<project>/{<category>..., <model>}`, folders and directories.
    async fn ensure_layout(
        &self,
        tx: &mut dyn DocumentTransaction,
        journal: &mut Journal,
        owner: &AttachedTo,
    ) -> AppResult<ProjectLayout> {
        let root = self
            .ensure_dir(tx, journal, None, &self.config.root_folder, owner)
            .await?;
        let project = self
            .ensure_dir(tx, journal, Some(&root), &owner.entity_name, owner)
            .await?;

        let mut categories = HashMap::with_capacity(self.categories.len());
        for category in &self.categories {
            let folder = self
                .ensure_dir(tx, journal, Some(&project), category, owner)
                .await?;
            categories.insert(category.clone(), folder);
        }
        let model = self
            .ensure_dir(tx, journal, Some(&project), &self.config.model_folder, owner)
            .await?;

        Ok(ProjectLayout {
            project,
            categories,
            model,
        })
    }

    async fn ensure_dir(
        &self,
        tx: &mut dyn DocumentTransaction,
        journal: &mut Journal,
        parent: Option<&Folder>,
        name: &str,
        owner: &AttachedTo,
    ) -> AppResult<Folder> {
        let ensured = self.folders.ensure_folder(tx, parent, name, owner).await?;

        // One level at a time, so implicitly created ancestors are journalled too.
        let mut prefix = String::with_capacity(ensured.folder.path.len());
        for segment in ensured.folder.path.split('/') {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            if !self.storage.exists(&prefix).await? {
                self.storage.create_dir(&prefix).await?;
                journal.directories.push(prefix.clone());
            }
        }
        Ok(ensured.folder)
    }

    /// Pick a free name, write the blob, then insert the record.
    #[allow(clippy::too_many_arguments)]
    async fn store_file(
        &self,
        tx: &mut dyn DocumentTransaction,
        journal: &mut Journal,
        folder: &Folder,
        owner: &AttachedTo,
        generate_name: impl Fn() -> String,
        category: &str,
        data: Bytes,
        original_name: Option<String>,
    ) -> AppResult<File> {
        let mut chosen = None;
        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = generate_name();
            let storage_path = folder.child_path(&name);
            if !tx.file_name_taken(folder.id, &name).await?
                && !self.storage.exists(&storage_path).await?
            {
                chosen = Some((name, storage_path));
                break;
            }
            debug!(folder = %folder.path, name = %name, "Generated name taken, drawing again");
        }
        let (name, storage_path) = chosen.ok_or_else(|| {
            AppError::conflict(format!("Could not find a free file name in '{}'", folder.path))
        })?;

        let size_bytes = data.len() as i64;
        let checksum = content_hash(&data);
        self.storage.write(&storage_path, data).await?;
        journal.blobs.push(storage_path.clone());

        let record = CreateFile {
            folder_id: folder.id,
            mime_type: mime_from_path(&name),
            file_url: format!("{}/{}", self.config.file_url_prefix, storage_path),
            name,
            storage_path,
            size_bytes,
            content_hash: checksum,
            category: category.to_string(),
            original_name,
            is_private: self.config.private_files,
            attached_to_type: Some(owner.entity_type.clone()),
            attached_to_name: Some(owner.entity_name.clone()),
        };
        let file = tx.create_file(&record).await?;

        debug!(
            file_id = %file.id,
            path = %file.storage_path,
            size = file.size_bytes,
            "Stored file"
        );
        Ok(file)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn uploaded(file: &File, label: &str) -> UploadedFile {
    UploadedFile {
        name: file.name.clone(),
        url: file.file_url.clone(),
        label: label.to_string(),
        docname: file.id,
        size_bytes: file.size_bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use trainhub_core::error::ErrorKind;
    use trainhub_database::MemoryDocumentStore;
    use trainhub_storage::LocalStorageProvider;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];

    /// Local storage that fails every write after the first `allowed`,
    /// waiting `delay` before it does.
    #[derive(Debug)]
    struct FlakyStorage {
        inner: LocalStorageProvider,
        allowed: usize,
        delay: Duration,
        writes: AtomicUsize,
    }

    impl FlakyStorage {
        fn new(inner: LocalStorageProvider, allowed: usize, delay: Duration) -> Self {
            Self {
                inner,
                allowed,
                delay,
                writes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl StorageProvider for FlakyStorage {
        fn provider_type(&self) -> &str {
            "flaky"
        }
        async fn health_check(&self) -> AppResult<bool> {
            Ok(true)
        }
        async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
            self.inner.read_bytes(path).await
        }
        async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
            if self.writes.fetch_add(1, Ordering::SeqCst) >= self.allowed {
                tokio::time::sleep(self.delay).await;
                return Err(AppError::storage("disk full"));
            }
            self.inner.write(path, data).await
        }
        async fn delete(&self, path: &str) -> AppResult<()> {
            self.inner.delete(path).await
        }
        async fn remove_empty_dir(&self, path: &str) -> AppResult<bool> {
            self.inner.remove_empty_dir(path).await
        }
        async fn exists(&self, path: &str) -> AppResult<bool> {
            self.inner.exists(path).await
        }
        async fn create_dir(&self, path: &str) -> AppResult<()> {
            self.inner.create_dir(path).await
        }
    }

    async fn setup(
        config: UploadConfig,
    ) -> (tempfile::TempDir, MemoryDocumentStore, LocalStorageProvider, UploadService) {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorageProvider::new(dir.path().to_str().unwrap())
            .await
            .unwrap();
        let store = MemoryDocumentStore::with_projects(["alpha"]);
        let service = UploadService::new(
            Arc::new(store.clone()),
            Arc::new(storage.clone()),
            config,
        );
        (dir, store, storage, service)
    }

    fn encoded(data: &[u8]) -> String {
        STANDARD.encode(data)
    }

    fn request(entries: Vec<DataFileEntry>) -> UploadRequest {
        UploadRequest {
            project_name: "alpha".into(),
            data_files: entries,
            model_file: None,
        }
    }

    #[tokio::test]
    async fn test_unknown_project_is_not_found() {
        let (_dir, store, _storage, service) = setup(UploadConfig::default()).await;
        let mut req = request(vec![DataFileEntry::new(encoded(PNG), "ok")]);
        req.project_name = "ghost".into();

        let err = service.upload(req).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(
            err.message,
            "Failed to upload training data: Project 'ghost' does not exist."
        );
        assert!(store.folders().await.is_empty());
    }

    #[tokio::test]
    async fn test_files_land_in_their_category_folder() {
        let (_dir, store, storage, service) = setup(UploadConfig::default()).await;
        let manifest = service
            .upload(request(vec![
                DataFileEntry::new(encoded(PNG), "OK"),
                DataFileEntry::new(encoded(b"raw"), "defective").with_name("scan.JPG"),
            ]))
            .await
            .unwrap();

        assert_eq!(manifest.count, 2);
        assert_eq!(manifest.folder_path, "/app/file/Home/training_data/alpha");
        assert_eq!(manifest.message, "Training data uploaded successfully.");

        let ok = &manifest.files[0];
        assert_eq!(ok.label, "ok");
        assert!(ok.name.starts_with("alphaok1_"));
        assert!(ok.name.ends_with(".png"));
        assert!(ok.url.starts_with("/private/files/Home/training_data/alpha/ok/"));

        let defective = &manifest.files[1];
        assert!(defective.name.starts_with("alphadefective2_"));
        assert!(defective.name.ends_with(".jpg"));

        let files = store.files().await;
        let folders = store.folders().await;
        for file in &files {
            let folder = folders.iter().find(|f| f.id == file.folder_id).unwrap();
            assert_eq!(folder.name, file.category);
            assert!(storage.exists(&file.storage_path).await.unwrap());
        }
        // training_data, alpha, ok, defective, model
        assert_eq!(folders.len(), 5);
        assert!(storage.exists("Home/training_data/alpha/model").await.unwrap());
    }

    #[tokio::test]
    async fn test_second_call_reuses_folders() {
        let (_dir, store, _storage, service) = setup(UploadConfig::default()).await;
        service
            .upload(request(vec![DataFileEntry::new(encoded(PNG), "ok")]))
            .await
            .unwrap();
        service
            .upload(request(vec![DataFileEntry::new(encoded(PNG), "ok")]))
            .await
            .unwrap();

        assert_eq!(store.folders().await.len(), 5);
        assert_eq!(store.files().await.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_category_skip_and_reject() {
        let (_dir, store, _storage, service) = setup(UploadConfig::default()).await;
        let manifest = service
            .upload(request(vec![
                DataFileEntry::new(encoded(PNG), "maybe"),
                DataFileEntry::new(encoded(PNG), "ok"),
            ]))
            .await
            .unwrap();
        assert_eq!(manifest.count, 1);
        assert!(manifest.files[0].name.starts_with("alphaok2_"));
        assert_eq!(manifest.skipped.len(), 1);
        assert_eq!(manifest.skipped[0].index, 0);
        assert_eq!(manifest.skipped[0].category, "maybe");
        assert_eq!(store.files().await.len(), 1);

        let config = UploadConfig {
            unknown_category: UnknownCategoryPolicy::Reject,
            ..UploadConfig::default()
        };
        let (_dir, _store, _storage, service) = setup(config).await;
        let err = service
            .upload(request(vec![DataFileEntry::new(encoded(PNG), "maybe")]))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_missing_fields_fail_before_any_write() {
        let (_dir, store, storage, service) = setup(UploadConfig::default()).await;
        let err = service
            .upload(request(vec![
                DataFileEntry::new(encoded(PNG), "ok"),
                DataFileEntry {
                    content: None,
                    category: Some("ok".into()),
                    name: None,
                },
            ]))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("missing content or category"));
        assert!(store.folders().await.is_empty());
        assert!(!storage.exists("Home").await.unwrap());
    }

    #[tokio::test]
    async fn test_model_extension_is_forced() {
        let (_dir, store, _storage, service) = setup(UploadConfig::default()).await;
        let mut req = request(vec![DataFileEntry::new(encoded(PNG), "ok")]);
        req.model_file = Some(ModelFileEntry::new(encoded(b"weights"), "net.keras"));

        let manifest = service.upload(req).await.unwrap();
        let model = manifest.model_file.as_ref().unwrap();
        assert!(model.name.starts_with("alphamodel"));
        assert!(model.name.ends_with(".h5"));
        assert_eq!(model.name.len(), "alphamodel".len() + 8 + ".h5".len());
        assert_eq!(model.original_name, "net.keras");
        assert_eq!(manifest.count, 2);
        assert_eq!(manifest.files_labelled("model").count(), 1);
        assert_eq!(
            manifest.message,
            "Training data and model file (.h5) uploaded successfully."
        );

        let stored = store.files().await;
        let record = stored.iter().find(|f| f.category == "model").unwrap();
        assert_eq!(record.mime_type.as_deref(), Some("application/x-hdf5"));
    }

    #[tokio::test]
    async fn test_incomplete_model_is_ignored() {
        let (_dir, _store, _storage, service) = setup(UploadConfig::default()).await;
        let mut req = request(Vec::new());
        req.model_file = Some(ModelFileEntry {
            content: Some(encoded(b"weights")),
            name: None,
        });

        let manifest = service.upload(req).await.unwrap();
        assert!(manifest.model_file.is_none());
        assert_eq!(manifest.count, 0);
    }

    #[tokio::test]
    async fn test_limits() {
        let config = UploadConfig {
            max_entries: 1,
            ..UploadConfig::default()
        };
        let (_dir, _store, _storage, service) = setup(config).await;
        let err = service
            .upload(request(vec![
                DataFileEntry::new(encoded(PNG), "ok"),
                DataFileEntry::new(encoded(PNG), "ok"),
            ]))
            .await
            .unwrap_err();
        assert!(err.message.contains("Too many data files"));

        let config = UploadConfig {
            max_total_bytes: 4,
            ..UploadConfig::default()
        };
        let (_dir, _store, _storage, service) = setup(config).await;
        let err = service
            .upload(request(vec![DataFileEntry::new(encoded(PNG), "ok")]))
            .await
            .unwrap_err();
        assert!(err.message.contains("decoded bytes"));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let inner = LocalStorageProvider::new(dir.path().to_str().unwrap())
            .await
            .unwrap();
        let storage = Arc::new(FlakyStorage::new(inner.clone(), 1, Duration::ZERO));
        let store = MemoryDocumentStore::with_projects(["alpha"]);
        let service = UploadService::new(Arc::new(store.clone()), storage, UploadConfig::default());

        let err = service
            .upload(request(vec![
                DataFileEntry::new(encoded(PNG), "ok"),
                DataFileEntry::new(encoded(PNG), "defective"),
            ]))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Storage);
        assert!(err.message.starts_with("Failed to upload training data: "));
        assert!(store.folders().await.is_empty());
        assert!(store.files().await.is_empty());
        assert!(!inner.exists("Home/training_data").await.unwrap());
        assert!(!inner.exists("Home").await.unwrap());
    }

    #[tokio::test]
    async fn test_abandoned_call_still_unwinds() {
        let dir = tempfile::tempdir().unwrap();
        let inner = LocalStorageProvider::new(dir.path().to_str().unwrap())
            .await
            .unwrap();
        let storage = Arc::new(FlakyStorage::new(inner.clone(), 1, Duration::from_millis(300)));
        let store = MemoryDocumentStore::with_projects(["alpha"]);
        let service = UploadService::new(Arc::new(store.clone()), storage, UploadConfig::default());

        let outcome = tokio::time::timeout(
            Duration::from_millis(50),
            service.upload(request(vec![
                DataFileEntry::new(encoded(PNG), "ok"),
                DataFileEntry::new(encoded(PNG), "defective"),
            ])),
        )
        .await;
        assert!(outcome.is_err());

        service.drain().await;
        assert!(store.folders().await.is_empty());
        assert!(store.files().await.is_empty());
        assert!(!inner.exists("Home").await.unwrap());
    }

    #[tokio::test]
    async fn test_drained_service_refuses_uploads() {
        let (_dir, _store, _storage, service) = setup(UploadConfig::default()).await;
        service.drain().await;

        let err = service
            .upload(request(vec![DataFileEntry::new(encoded(PNG), "ok")]))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
    }

    #[tokio::test]
    async fn test_unrecognised_bytes_get_default_extension() {
        let (_dir, _store, _storage, service) = setup(UploadConfig::default()).await;
        let manifest = service
            .upload(request(vec![DataFileEntry::new(encoded(b"raw"), "ok")]))
            .await
            .unwrap();

        assert!(manifest.files[0].name.starts_with("alphaok1_"));
        assert!(manifest.files[0].name.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_taken_name_is_drawn_again() {
        let (_dir, store, storage, service) = setup(UploadConfig::default()).await;
        let owner = AttachedTo::project("alpha");
        let mut tx = store.begin().await.unwrap();
        let mut journal = Journal::default();
        let layout = service
            .ensure_layout(tx.as_mut(), &mut journal, &owner)
            .await
            .unwrap();
        let folder = &layout.categories["ok"];
        let data = Bytes::from_static(PNG);

        service
            .store_file(
                tx.as_mut(),
                &mut journal,
                folder,
                &owner,
                || "alphaok1_aaaaaa.png".to_string(),
                "ok",
                data.clone(),
                None,
            )
            .await
            .unwrap();

        let draws = AtomicUsize::new(0);
        let second = service
            .store_file(
                tx.as_mut(),
                &mut journal,
                folder,
                &owner,
                || match draws.fetch_add(1, Ordering::SeqCst) {
                    0 => "alphaok1_aaaaaa.png".to_string(),
                    _ => "alphaok1_bbbbbb.png".to_string(),
                },
                "ok",
                data.clone(),
                None,
            )
            .await
            .unwrap();
        assert_eq!(second.name, "alphaok1_bbbbbb.png");
        assert_eq!(draws.load(Ordering::SeqCst), 2);

        let draws = AtomicUsize::new(0);
        let err = service
            .store_file(
                tx.as_mut(),
                &mut journal,
                folder,
                &owner,
                || {
                    draws.fetch_add(1, Ordering::SeqCst);
                    "alphaok1_aaaaaa.png".to_string()
                },
                "ok",
                data,
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(draws.load(Ordering::SeqCst), MAX_NAME_ATTEMPTS);

        tx.rollback().await.unwrap();
        journal.unwind(&storage).await;
        assert!(!storage.exists("Home").await.unwrap());
    }
}
