//! Training-data upload flow.

pub mod decode;
pub mod naming;
pub mod service;

pub use service::UploadService;
