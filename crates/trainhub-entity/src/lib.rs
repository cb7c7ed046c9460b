//! # trainhub-entity
//!
//! Domain entity models for TrainHub. Record structs represent database
//! table rows and derive `sqlx::FromRow`; the `upload` module holds the
//! request and manifest value objects exchanged with callers.

pub mod attachment;
pub mod file;
pub mod folder;
pub mod project;
pub mod upload;

pub use attachment::AttachedTo;
