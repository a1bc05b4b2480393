use serde::{Deserialize, Serialize};

use crate::core::config::GenerationConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling settings handed to the generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    /// Total length in tokens, prompt included.
    pub max_length: u32,
    pub top_k: u32,
    pub top_p: f64,
}

impl SamplingParams {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            max_length: config.max_length,
            top_k: config.top_k,
            top_p: config.top_p,
        }
    }

    pub fn interactive(config: &GenerationConfig) -> Self {
        Self {
            max_length: config.interactive_max_length,
            ..Self::from_config(config)
        }
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}
