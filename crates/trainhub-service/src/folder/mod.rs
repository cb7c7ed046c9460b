//! Folder hierarchy management.

pub mod service;

pub use service::{EnsuredFolder, FolderService, validate_folder_name};
