//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use trainhub_api::{AppState, build_router};
use trainhub_core::config::AppConfig;
use trainhub_database::MemoryDocumentStore;
use trainhub_storage::LocalStorageProvider;

/// Smallest byte string `image::guess_format` recognises as PNG.
pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Record store, for direct inspection
    pub store: MemoryDocumentStore,
    /// Blob storage rooted in a temporary directory
    pub storage: LocalStorageProvider,
    /// Application config
    pub config: AppConfig,
    _root: TempDir,
}

impl TestApp {
    /// Create a test application with projects `alpha` and `beta`
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test application after adjusting the fixture config
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::load_file("tests/fixtures/test_config.toml")
            .expect("Failed to load test config");
        let root = tempfile::tempdir().expect("Failed to create storage root");
        config.storage.root_path = root.path().to_string_lossy().into_owned();
        adjust(&mut config);

        let store = MemoryDocumentStore::with_projects(config.database.seed_projects.clone());
        let storage = LocalStorageProvider::new(&config.storage.root_path)
            .await
            .expect("Failed to init storage");

        let state = AppState::new(
            config.clone(),
            Arc::new(store.clone()),
            Arc::new(storage.clone()),
        );

        Self {
            router: build_router(state),
            store,
            storage,
            config,
            _root: root,
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<String>) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.unwrap_or_default()))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// POST a JSON body to `/api/uploads`
    pub async fn upload(&self, body: Value) -> TestResponse {
        self.request("POST", "/api/uploads", Some(body.to_string()))
            .await
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Base64 of `data`.
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}
