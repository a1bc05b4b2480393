use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::core::errors::ApiError;
use crate::server::upload::receive_upload;
use crate::state::AppState;

const PDF_FIELD: &str = "pdf";
const MODEL_NAME_FIELD: &str = "modelName";

/// Fine-tunes a model named by `modelName` on the uploaded `pdf`.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = receive_upload(multipart, &state.uploads_dir, PDF_FIELD).await?;
    let file = form
        .file
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest("No file uploaded.".to_string()))?;
    let model_name = form
        .field(MODEL_NAME_FIELD)
        .ok_or_else(|| ApiError::BadRequest("Model name is required.".to_string()))?;

    let output_dir = state.models.resolve(model_name)?;
    tracing::info!(
        "File uploaded: {}, Model Name: {}",
        file.path.display(),
        model_name
    );

    match state.pipeline.run(&file.path, &output_dir).await {
        Ok(report) => Ok(Json(json!({
            "message": "Training completed",
            "logs": report.logs,
            "blocks": report.block_count,
            "tokens": report.token_count,
        }))),
        Err(err) => {
            tracing::error!("Training {} failed: {}", model_name, err);
            let logs = err
                .logs()
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string());
            Err(ApiError::detailed(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"message": "Training failed", "logs": logs}),
            ))
        }
    }
}

/// Returns the text of the uploaded `pdf`.
pub async fn extract_text(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = receive_upload(multipart, &state.uploads_dir, PDF_FIELD).await?;
    let file = form
        .file
        .ok_or_else(|| ApiError::BadRequest("No file uploaded.".to_string()))?;

    match state.pipeline.extractor().extract(&file.path).await {
        Ok(text) => Ok(Json(json!({ "text": text.trim() }))),
        Err(err) => {
            tracing::error!("Extraction of {} failed: {}", file.original_name, err);
            Err(ApiError::detailed(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"message": "Extraction failed", "error": err.to_string()}),
            ))
        }
    }
}
