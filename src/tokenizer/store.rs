use std::path::{Path, PathBuf};

use super::{HubClient, TextTokenizer, TokenizerError, TOKENIZER_FILE};

/// Finds tokenizers for local model directories and hub models, keeping
/// downloaded hub tokenizers in a cache directory.
#[derive(Clone)]
pub struct TokenizerStore {
    cache_dir: PathBuf,
    hub: HubClient,
}

impl TokenizerStore {
    pub fn new(cache_dir: PathBuf, hub: HubClient) -> Self {
        Self { cache_dir, hub }
    }

    pub fn cached_path(&self, repo_id: &str) -> PathBuf {
        self.cache_dir.join(repo_id).join(TOKENIZER_FILE)
    }

    /// `model` is either a directory holding `tokenizer.json` or a hub repo id.
    pub async fn resolve(&self, model: &str) -> Result<TextTokenizer, TokenizerError> {
        let path = self.locate(model).await?;
        load_blocking(path).await
    }

    async fn locate(&self, model: &str) -> Result<PathBuf, TokenizerError> {
        let local = Path::new(model).join(TOKENIZER_FILE);
        if local.is_file() {
            tracing::debug!("Using local tokenizer {}", local.display());
            return Ok(local);
        }

        let cached = self.cached_path(model);
        if cached.is_file() {
            tracing::debug!("Using cached tokenizer {}", cached.display());
            return Ok(cached);
        }

        self.hub.download(model, TOKENIZER_FILE, &cached).await?;
        Ok(cached)
    }
}

async fn load_blocking(path: PathBuf) -> Result<TextTokenizer, TokenizerError> {
    tokio::task::spawn_blocking(move || TextTokenizer::from_file(&path))
        .await
        .map_err(|e| TokenizerError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
}
