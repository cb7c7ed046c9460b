//! # trainhub-service
//!
//! Business logic for TrainHub. [`UploadService`] validates and decodes an
//! upload, builds the project folder hierarchy through [`FolderService`],
//! and writes every blob and record inside one document transaction.
//!
//! Services take their dependencies as `Arc` handles at construction time.

pub mod folder;
pub mod upload;

pub use folder::{EnsuredFolder, FolderService};
pub use upload::UploadService;
