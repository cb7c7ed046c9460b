//! Health check handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use trainhub_core::result::AppResult;

use crate::dto::response::{ApiResponse, ComponentHealth, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

/// GET /api/health/detailed
///
/// Answers 503 when the document store or the storage provider is down.
pub async fn health_detailed(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<DetailedHealthResponse>>) {
    let database = component(state.store.backend(), state.store.health_check().await);
    let storage = component(state.storage.provider_type(), state.storage.health_check().await);

    let healthy = database.error.is_none() && storage.error.is_none();
    let (status_code, status) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = DetailedHealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        database,
        storage,
    };
    (status_code, Json(ApiResponse::ok(body)))
}

fn component(backend: &str, result: AppResult<bool>) -> ComponentHealth {
    let error = match result {
        Ok(true) => None,
        Ok(false) => Some("health check returned false".to_string()),
        Err(e) => Some(e.message),
    };
    ComponentHealth {
        backend: backend.to_string(),
        status: if error.is_none() { "ok" } else { "unavailable" }.to_string(),
        error,
    }
}
