use thiserror::Error;

use crate::core::config::ConfigError;
use crate::tokenizer::TokenizerError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to prepare storage: {0}")]
    Storage(#[source] std::io::Error),

    #[error("Failed to initialize tokenizer hub client: {0}")]
    Tokenizer(#[from] TokenizerError),
}
