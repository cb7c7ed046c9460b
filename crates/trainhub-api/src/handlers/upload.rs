//! Training-data upload handler.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use validator::Validate;

use trainhub_entity::upload::UploadManifest;

use crate::dto::request::UploadTrainingDataRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/uploads
pub async fn upload_training_data(
    State(state): State<AppState>,
    payload: Result<Json<UploadTrainingDataRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UploadManifest>>, ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let manifest = state.upload_service.upload(req.into()).await?;
    Ok(Json(ApiResponse::ok(manifest)))
}
