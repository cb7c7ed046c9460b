//! # trainhub-api
//!
//! HTTP API layer for TrainHub built on Axum: the upload endpoint, health
//! checks, request logging, CORS, and error mapping.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
