use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults::*;
use crate::dataset::{block_size_from_i64, DatasetError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub hub: HubConfig,
    pub training: TrainingConfig,
    pub generation: GenerationConfig,
    pub remote_chat: RemoteChatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub public_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_allowed_origins: Vec::new(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            public_dir: PathBuf::from("public"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub models_dir: PathBuf,
    pub uploads_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            uploads_dir: PathBuf::from("uploads"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub endpoint: String,
    pub download_timeout_secs: u64,
}

impl HubConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_HUB_ENDPOINT.to_string(),
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandConfig {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Signed so that bad values surface as validation errors, not parse errors.
    pub block_size: i64,
    pub base_model: String,
    pub epochs: u32,
    pub batch_size: u32,
    pub save_steps: u32,
    pub save_total_limit: u32,
    pub command: CommandConfig,
}

impl TrainingConfig {
    pub fn block_size(&self) -> Result<usize, DatasetError> {
        block_size_from_i64(self.block_size)
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            base_model: DEFAULT_BASE_MODEL.to_string(),
            epochs: DEFAULT_EPOCHS,
            batch_size: DEFAULT_BATCH_SIZE,
            save_steps: DEFAULT_SAVE_STEPS,
            save_total_limit: DEFAULT_SAVE_TOTAL_LIMIT,
            command: CommandConfig::new(DEFAULT_TRAINER_PROGRAM),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub command: CommandConfig,
    pub max_length: u32,
    pub interactive_max_length: u32,
    pub top_k: u32,
    pub top_p: f64,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            command: CommandConfig::new(DEFAULT_GENERATOR_PROGRAM),
            max_length: DEFAULT_MAX_LENGTH,
            interactive_max_length: DEFAULT_INTERACTIVE_MAX_LENGTH,
            top_k: DEFAULT_TOP_K,
            top_p: DEFAULT_TOP_P,
            timeout_secs: DEFAULT_GENERATION_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteChatConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    /// Usually kept in `secrets.yml`.
    pub api_key: Option<String>,
    pub api_key_env: String,
}

impl RemoteChatConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
    }
}

impl Default for RemoteChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_REMOTE_CHAT_ENDPOINT.to_string(),
            model: DEFAULT_REMOTE_CHAT_MODEL.to_string(),
            max_tokens: DEFAULT_REMOTE_CHAT_MAX_TOKENS,
            api_key: None,
            api_key_env: DEFAULT_REMOTE_CHAT_KEY_ENV.to_string(),
        }
    }
}
