use std::path::PathBuf;
use std::sync::Arc;

use crate::core::config::{AppConfig, AppPaths, ConfigService};
use crate::llm::{ProcessGenerator, RemoteChatClient, TextGenerator};
use crate::models::ModelStore;
use crate::pdf::PdfExtractor;
use crate::tokenizer::{HubClient, TokenizerStore};
use crate::training::{ProcessTrainer, TrainingPipeline};

pub mod error;

use error::InitializationError;

/// Application state shared by the HTTP handlers and the CLI commands.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub models: ModelStore,
    pub uploads_dir: PathBuf,
    pub public_dir: PathBuf,
    pub pipeline: TrainingPipeline,
    pub generator: Arc<dyn TextGenerator>,
    pub remote_chat: RemoteChatClient,
}

impl AppState {
    /// Loads `config.yml` (merged with `secrets.yml`) and wires up the services.
    pub fn initialize(paths: Arc<AppPaths>) -> Result<Self, InitializationError> {
        let config = ConfigService::new(paths.clone()).load_config()?;
        Self::from_config(&paths, config)
    }

    pub fn from_config(paths: &AppPaths, config: AppConfig) -> Result<Self, InitializationError> {
        let models = ModelStore::new(paths.resolve(&config.storage.models_dir));
        models.ensure_root().map_err(InitializationError::Storage)?;
        let uploads_dir = paths.resolve(&config.storage.uploads_dir);
        let public_dir = paths.resolve(&config.server.public_dir);

        let hub = HubClient::new(&config.hub)?;
        let tokenizers = TokenizerStore::new(paths.tokenizer_cache_dir.clone(), hub);
        let pipeline = TrainingPipeline::new(
            config.training.clone(),
            PdfExtractor::new(),
            tokenizers,
            Arc::new(ProcessTrainer::new(&config.training)),
        );

        let generator: Arc<dyn TextGenerator> = Arc::new(ProcessGenerator::new(&config.generation));
        let remote_chat = RemoteChatClient::new(&config.remote_chat);

        Ok(AppState {
            config,
            models,
            uploads_dir,
            public_dir,
            pipeline,
            generator,
            remote_chat,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths_in(dir: &std::path::Path) -> Arc<AppPaths> {
        Arc::new(AppPaths::with_dirs(dir.to_path_buf(), dir.join("data")))
    }

    #[test]
    fn initialize_uses_defaults_without_config_files() {
        let dir = tempfile::tempdir().unwrap();

        let state = AppState::initialize(paths_in(dir.path())).unwrap();

        assert_eq!(state.models.root(), dir.path().join("models"));
        assert!(state.models.root().is_dir());
        assert_eq!(state.uploads_dir, dir.path().join("uploads"));
        assert_eq!(state.public_dir, dir.path().join("public"));
    }

    #[test]
    fn invalid_config_fails_initialization() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.yml"), "training:\n  block_size: -1\n").unwrap();

        let err = AppState::initialize(paths_in(dir.path())).err().unwrap();

        assert!(matches!(err, InitializationError::Config(_)));
    }
}
