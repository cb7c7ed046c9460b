//! Training-data upload CLI command.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use trainhub_core::error::{AppError, ErrorKind};
use trainhub_database::connect_store;
use trainhub_entity::upload::{DataFileEntry, ModelFileEntry, UploadRequest};
use trainhub_service::UploadService;
use trainhub_storage::connect_storage;

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Project the files belong to
    #[arg(short, long)]
    pub project: String,

    /// Data file as CATEGORY=PATH (repeatable)
    #[arg(long = "file", value_name = "CATEGORY=PATH", value_parser = parse_file_spec)]
    pub files: Vec<(String, PathBuf)>,

    /// Directory whose immediate subdirectories are categories
    #[arg(long)]
    pub from_dir: Option<PathBuf>,

    /// Serialized model file
    #[arg(long)]
    pub model: Option<PathBuf>,
}

/// One stored file, as printed.
#[derive(Debug, Serialize, Tabled)]
struct UploadedRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Size")]
    size_bytes: i64,
    #[tabled(rename = "URL")]
    url: String,
}

/// Execute the upload command
pub async fn execute(
    args: &UploadArgs,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;

    let mut sources = args.files.clone();
    if let Some(dir) = &args.from_dir {
        sources.extend(collect_dir(dir).await?);
    }
    if sources.is_empty() && args.model.is_none() {
        return Err(AppError::validation(
            "Nothing to upload: pass --file, --from-dir, or --model",
        ));
    }

    let mut data_files = Vec::with_capacity(sources.len());
    for (category, path) in &sources {
        let content = encode_file(path).await?;
        let mut entry = DataFileEntry::new(content, category.clone());
        if let Some(name) = file_name(path) {
            entry = entry.with_name(name);
        }
        data_files.push(entry);
    }

    let model_file = match &args.model {
        Some(path) => {
            let name = file_name(path).unwrap_or_else(|| "model".to_string());
            Some(ModelFileEntry::new(encode_file(path).await?, name))
        }
        None => None,
    };

    let store = connect_store(&config.database).await?;
    let storage = connect_storage(&config.storage).await?;
    let service = UploadService::new(store, storage, config.upload.clone());

    println!(
        "Uploading {} file(s) to project '{}'...",
        data_files.len() + usize::from(model_file.is_some()),
        args.project
    );

    let manifest = service
        .upload(UploadRequest {
            project_name: args.project.clone(),
            data_files,
            model_file,
        })
        .await?;

    match format {
        OutputFormat::Json => output::print_json(&manifest),
        OutputFormat::Table => {
            let rows: Vec<UploadedRow> = manifest
                .files
                .iter()
                .map(|f| UploadedRow {
                    name: f.name.clone(),
                    label: f.label.clone(),
                    size_bytes: f.size_bytes,
                    url: f.url.clone(),
                })
                .collect();
            output::print_list(&rows, format);
            for skipped in &manifest.skipped {
                output::print_warning(&format!(
                    "Skipped entry {} ({}): {}",
                    skipped.index + 1,
                    skipped.category,
                    skipped.reason
                ));
            }
            output::print_success(&manifest.message);
            output::print_kv("Folder", &manifest.folder_path);
        }
    }

    Ok(())
}

/// Parse `CATEGORY=PATH`.
fn parse_file_spec(spec: &str) -> Result<(String, PathBuf), String> {
    let (category, path) = spec
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=PATH, got '{spec}'"))?;
    if category.trim().is_empty() || path.trim().is_empty() {
        return Err(format!("expected CATEGORY=PATH, got '{spec}'"));
    }
    Ok((category.trim().to_string(), PathBuf::from(path)))
}

/// Every regular file of every immediate subdirectory, tagged with the
/// subdirectory name. Sorted by category, then path.
async fn collect_dir(dir: &Path) -> Result<Vec<(String, PathBuf)>, AppError> {
    let mut found = Vec::new();
    let mut categories = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| read_error("directory", dir, e))?;

    while let Some(category_dir) = categories.next_entry().await? {
        if !category_dir.file_type().await?.is_dir() {
            continue;
        }
        let category = category_dir.file_name().to_string_lossy().into_owned();
        let mut files = tokio::fs::read_dir(category_dir.path()).await?;
        while let Some(file) = files.next_entry().await? {
            if file.file_type().await?.is_file() {
                found.push((category.clone(), file.path()));
            }
        }
    }

    found.sort();
    Ok(found)
}

async fn encode_file(path: &Path) -> Result<String, AppError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| read_error("file", path, e))?;
    Ok(STANDARD.encode(bytes))
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

/// A missing local path is the caller's mistake, anything else is storage.
fn read_error(what: &str, path: &Path, err: std::io::Error) -> AppError {
    let kind = match err.kind() {
        std::io::ErrorKind::NotFound => ErrorKind::NotFound,
        _ => ErrorKind::Storage,
    };
    AppError::with_source(kind, format!("Failed to read {what}: {}", path.display()), err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_spec() {
        assert_eq!(
            parse_file_spec("ok=./scans/a.png").unwrap(),
            ("ok".to_string(), PathBuf::from("./scans/a.png"))
        );
        assert!(parse_file_spec("./scans/a.png").is_err());
        assert!(parse_file_spec("=a.png").is_err());
    }

    #[tokio::test]
    async fn test_collect_dir_uses_subdirectory_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("ok")).unwrap();
        std::fs::create_dir(dir.path().join("defective")).unwrap();
        std::fs::write(dir.path().join("ok/b.png"), b"b").unwrap();
        std::fs::write(dir.path().join("ok/a.png"), b"a").unwrap();
        std::fs::write(dir.path().join("defective/c.png"), b"c").unwrap();
        std::fs::write(dir.path().join("stray.txt"), b"x").unwrap();

        let found = collect_dir(dir.path()).await.unwrap();
        let summary: Vec<(String, String)> = found
            .iter()
            .map(|(c, p)| (c.clone(), file_name(p).unwrap()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("defective".to_string(), "c.png".to_string()),
                ("ok".to_string(), "a.png".to_string()),
                ("ok".to_string(), "b.png".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_encode_missing_file_is_not_found() {
        let err = encode_file(Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
