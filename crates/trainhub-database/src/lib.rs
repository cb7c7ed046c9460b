//! # trainhub-database
//!
//! Document store for project, folder, and file records. The
//! [`DocumentStore`] trait hands out transactions; PostgreSQL and
//! in-memory backends implement it.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{DocumentStore, DocumentTransaction, connect_store};
pub use store::memory::MemoryDocumentStore;
pub use store::postgres::PgDocumentStore;
