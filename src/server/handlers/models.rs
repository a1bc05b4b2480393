use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn list_models(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.models.list()?))
}
