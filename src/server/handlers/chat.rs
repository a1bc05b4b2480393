use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::errors::ApiError;
use crate::llm::{strip_prompt_echo, RemoteChatError, SamplingParams};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestBody {
    pub model_name: Option<String>,
    pub prompt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoteChatRequestBody {
    pub prompt: Option<String>,
    pub context: Option<String>,
}

/// Generates a reply from a fine-tuned model.
///
/// A body that is not JSON counts as an empty request.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequestBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let payload = body_or_default(payload);
    let (Some(model_name), Some(prompt)) = (
        non_empty(payload.model_name.as_deref()),
        non_empty(payload.prompt.as_deref()),
    ) else {
        return Err(ApiError::BadRequest(
            "Model name and prompt are required.".to_string(),
        ));
    };

    if !state.models.exists(model_name) {
        return Err(ApiError::NotFound("Model not found.".to_string()));
    }
    let model_dir = state.models.resolve(model_name)?;

    let params = SamplingParams::from_config(&state.config.generation);
    match state.generator.generate(&model_dir, prompt, &params).await {
        Ok(generated) => Ok(Json(json!({
            "response": strip_prompt_echo(&generated, prompt)
        }))),
        Err(err) => {
            tracing::error!(
                "Chat with {} via {} generator failed: {}",
                model_name,
                state.generator.name(),
                err
            );
            Err(ApiError::detailed(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"message": "Chat generation failed", "error": err.to_string()}),
            ))
        }
    }
}

/// Answers with the hosted chat model, optionally grounded in `context`.
pub async fn remote_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RemoteChatRequestBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let payload = body_or_default(payload);
    let prompt = non_empty(payload.prompt.as_deref())
        .ok_or_else(|| ApiError::BadRequest("Prompt is required.".to_string()))?;

    match state.remote_chat.ask(prompt, payload.context.as_deref()).await {
        Ok(response) => Ok(Json(json!({ "response": response }))),
        Err(RemoteChatError::Upstream { status, body }) => {
            tracing::warn!("Remote chat returned {}", status);
            Err(ApiError::detailed(status, json!({ "message": body })))
        }
        Err(RemoteChatError::InvalidResponse(detail)) => {
            tracing::error!("Remote chat sent an invalid response: {}", detail);
            Err(ApiError::Internal("Invalid response from Kimi API".to_string()))
        }
        Err(RemoteChatError::Connect(detail)) => {
            tracing::error!("Remote chat error: {}", detail);
            Err(ApiError::Internal("Failed to connect to Kimi API".to_string()))
        }
    }
}

fn body_or_default<T: Default>(payload: Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!("Treating unreadable body as empty: {}", rejection);
            T::default()
        }
    }
}

/// Values are passed on as sent; only missing or empty ones are rejected.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
