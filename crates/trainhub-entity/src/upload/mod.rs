//! Upload request and manifest value objects.

pub mod manifest;
pub mod request;

pub use manifest::{ModelFileInfo, SkippedEntry, UploadManifest, UploadedFile};
pub use request::{DataFileEntry, ModelFileEntry, UploadRequest};
