//! Core traits defined in `trainhub-core` and implemented by other crates.

pub mod storage;

pub use storage::StorageProvider;
