//! SQL queries for each record type.
//!
//! Repositories are stateless and run on whatever connection they are
//! handed, so a caller can group several calls into one transaction.

pub mod file;
pub mod folder;
pub mod project;

pub use file::FileRepository;
pub use folder::FolderRepository;
pub use project::ProjectRepository;
