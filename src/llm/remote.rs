use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;

use super::types::ChatMessage;
use crate::core::config::RemoteChatConfig;

#[derive(Debug, Error)]
pub enum RemoteChatError {
    #[error("failed to reach chat endpoint: {0}")]
    Connect(String),
    #[error("invalid response from chat endpoint: {0}")]
    InvalidResponse(String),
    #[error("chat endpoint returned {status}")]
    Upstream { status: StatusCode, body: Value },
}

/// OpenAI-compatible chat completion client for a hosted model.
#[derive(Clone)]
pub struct RemoteChatClient {
    endpoint: String,
    model: String,
    max_tokens: u32,
    api_key: Option<String>,
    client: Client,
}

impl RemoteChatClient {
    pub fn new(config: &RemoteChatConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_key: config.resolve_api_key(),
            client: Client::new(),
        }
    }

    /// Without a key requests go out with no `Authorization` header.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Asks the hosted model `prompt`, grounding it in `context` when given.
    pub async fn ask(&self, prompt: &str, context: Option<&str>) -> Result<String, RemoteChatError> {
        let body = json!({
            "model": self.model,
            "messages": [ChatMessage::user(build_prompt(prompt, context))],
            "max_tokens": self.max_tokens,
            "stream": false,
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let res = request
            .send()
            .await
            .map_err(|e| RemoteChatError::Connect(e.to_string()))?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| RemoteChatError::Connect(e.to_string()))?;

        parse_completion(status, &text)
    }
}

pub fn build_prompt(prompt: &str, context: Option<&str>) -> String {
    match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(context) => format!(
            "Context:\n{}\n\nQuestion: {}\n\nAnswer based on the context above:",
            context, prompt
        ),
        None => prompt.to_string(),
    }
}

fn parse_completion(status: StatusCode, text: &str) -> Result<String, RemoteChatError> {
    let payload: Value = serde_json::from_str(text).map_err(|_| {
        tracing::error!("Failed to parse JSON response: {}", text);
        RemoteChatError::InvalidResponse(text.chars().take(200).collect())
    })?;

    if !status.is_success() {
        return Err(RemoteChatError::Upstream {
            status,
            body: payload,
        });
    }

    payload["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| RemoteChatError::InvalidResponse("missing choices[0].message.content".into()))
}
