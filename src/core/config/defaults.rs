//! Built-in configuration values used when `config.yml` leaves a field out.

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7860;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub const DEFAULT_HUB_ENDPOINT: &str = "https://huggingface.co";
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_BASE_MODEL: &str = "gpt2";
pub const DEFAULT_BLOCK_SIZE: i64 = 128;
pub const DEFAULT_EPOCHS: u32 = 3;
pub const DEFAULT_BATCH_SIZE: u32 = 4;
pub const DEFAULT_SAVE_STEPS: u32 = 10_000;
pub const DEFAULT_SAVE_TOTAL_LIMIT: u32 = 2;
pub const DEFAULT_TRAINER_PROGRAM: &str = "pdftune-trainer";

pub const DEFAULT_GENERATOR_PROGRAM: &str = "pdftune-generate";
pub const DEFAULT_MAX_LENGTH: u32 = 150;
pub const DEFAULT_INTERACTIVE_MAX_LENGTH: u32 = 100;
pub const DEFAULT_TOP_K: u32 = 50;
pub const DEFAULT_TOP_P: f64 = 0.95;
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_REMOTE_CHAT_ENDPOINT: &str = "https://router.huggingface.co/v1/chat/completions";
pub const DEFAULT_REMOTE_CHAT_MODEL: &str = "moonshotai/Kimi-K2.5";
pub const DEFAULT_REMOTE_CHAT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_REMOTE_CHAT_KEY_ENV: &str = "HF_TOKEN";
