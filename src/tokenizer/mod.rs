pub mod hub;
pub mod store;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokenizers::Tokenizer;

pub use hub::HubClient;
pub use store::TokenizerStore;

pub const TOKENIZER_FILE: &str = "tokenizer.json";

#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("cannot load tokenizer from '{}': {message}", .path.display())]
    Load { path: PathBuf, message: String },
    #[error("tokenizer download failed: {0}")]
    Download(String),
    #[error("invalid model id: {0}")]
    InvalidModel(String),
    #[error("encoding failed: {0}")]
    Encode(String),
    #[error("decoding failed: {0}")]
    Decode(String),
    #[error("saving tokenizer failed: {0}")]
    Save(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Shared handle to a loaded `tokenizers` tokenizer.
#[derive(Clone)]
pub struct TextTokenizer {
    inner: Arc<Tokenizer>,
}

impl TextTokenizer {
    pub fn from_file(path: &Path) -> Result<Self, TokenizerError> {
        let tokenizer = Tokenizer::from_file(path).map_err(|e| TokenizerError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self::from_tokenizer(tokenizer))
    }

    pub fn from_tokenizer(tokenizer: Tokenizer) -> Self {
        Self {
            inner: Arc::new(tokenizer),
        }
    }

    pub fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(true)
    }

    /// Encodes raw text without adding special tokens.
    pub fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| TokenizerError::Encode(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    pub fn decode(&self, ids: &[u32]) -> Result<String, TokenizerError> {
        self.inner
            .decode(ids, true)
            .map_err(|e| TokenizerError::Decode(e.to_string()))
    }

    /// Writes `tokenizer.json` into `dir`.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, TokenizerError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(TOKENIZER_FILE);
        self.inner
            .save(&path, false)
            .map_err(|e| TokenizerError::Save(e.to_string()))?;
        Ok(path)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn encodes_words_to_ids() {
        let tokenizer = word_level();
        assert_eq!(tokenizer.encode("the cat sat").unwrap(), vec![1, 2, 3]);
        assert_eq!(tokenizer.encode("the dog").unwrap(), vec![1, 0]);
        assert_eq!(tokenizer.vocab_size(), 6);
    }

    #[test]
    fn decode_joins_known_words() {
        let tokenizer = word_level();
        let ids = tokenizer.encode("the cat sat on the mat").unwrap();

        assert_eq!(tokenizer.decode(&ids).unwrap(), "the cat sat on the mat");
        assert_eq!(tokenizer.decode(&[]).unwrap(), "");
    }

    #[test]
    fn save_round_trips_through_a_directory() {
        let tokenizer = word_level();
        let dir = tempfile::tempdir().unwrap();

        let path = tokenizer.save(&dir.path().join("model")).unwrap();
        let reloaded = TextTokenizer::from_file(&path).unwrap();

        assert_eq!(reloaded.encode("on the mat").unwrap(), vec![4, 1, 5]);
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = TextTokenizer::from_file(Path::new("/nonexistent/tokenizer.json"))
            .err()
            .unwrap();
        assert!(matches!(err, TokenizerError::Load { .. }));
    }
}
