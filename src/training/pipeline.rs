use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use super::prepare::{prepare_dataset, write_dataset, TEXT_FILE};
use super::trainer::{TrainerBackend, TrainingJob};
use super::TrainingError;
use crate::core::config::TrainingConfig;
use crate::pdf::PdfExtractor;
use crate::tokenizer::TokenizerStore;

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub output_dir: PathBuf,
    pub token_count: usize,
    pub block_count: usize,
    pub dropped_tokens: usize,
    pub logs: String,
}

/// PDF in, fine-tuned model directory out.
///
/// Extraction, tokenization and windowing happen here; the optimisation loop
/// itself belongs to the configured [`TrainerBackend`].
#[derive(Clone)]
pub struct TrainingPipeline {
    config: TrainingConfig,
    extractor: PdfExtractor,
    tokenizers: TokenizerStore,
    trainer: Arc<dyn TrainerBackend>,
}

impl TrainingPipeline {
    pub fn new(
        config: TrainingConfig,
        extractor: PdfExtractor,
        tokenizers: TokenizerStore,
        trainer: Arc<dyn TrainerBackend>,
    ) -> Self {
        Self {
            config,
            extractor,
            tokenizers,
            trainer,
        }
    }

    /// Same pipeline with another block size. It is validated when the
    /// pipeline runs.
    pub fn with_block_size(mut self, block_size: i64) -> Self {
        self.config.block_size = block_size;
        self
    }

    pub fn extractor(&self) -> &PdfExtractor {
        &self.extractor
    }

    pub async fn run(&self, pdf_path: &Path, output_dir: &Path) -> Result<TrainingReport, TrainingError> {
        tracing::info!("Extracting text from {}...", pdf_path.display());
        let text = self.extractor.extract(pdf_path).await?;
        self.run_text(&text, output_dir).await
    }

    /// Everything after extraction: dataset preparation and training.
    pub async fn run_text(&self, text: &str, output_dir: &Path) -> Result<TrainingReport, TrainingError> {
        let block_size = self.config.block_size()?;
        let mut progress = Vec::new();

        tokio::fs::create_dir_all(output_dir).await?;
        tokio::fs::write(output_dir.join(TEXT_FILE), text).await?;

        note(&mut progress, "Loading tokenizer...".to_string());
        let tokenizer = self.tokenizers.resolve(&self.config.base_model).await?;

        note(&mut progress, "Preparing dataset...".to_string());
        let owned_text = text.to_string();
        let encoder = tokenizer.clone();
        let prepared = tokio::task::spawn_blocking(move || {
            prepare_dataset(&owned_text, &encoder, block_size)
        })
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;

        if prepared.dataset.is_empty() {
            return Err(TrainingError::EmptyDataset {
                tokens: prepared.token_count,
                block_size,
            });
        }
        if prepared.dropped_tokens() > 0 {
            tracing::debug!(
                "Dropping {} trailing tokens that do not fill a block",
                prepared.dropped_tokens()
            );
        }
        note(
            &mut progress,
            format!(
                "Prepared {} blocks of {} tokens from {} tokens",
                prepared.dataset.len(),
                block_size,
                prepared.token_count
            ),
        );

        let dataset_path = write_dataset(&prepared.dataset, output_dir)?;
        tokenizer.save(output_dir)?;

        note(&mut progress, "Starting training...".to_string());
        tracing::info!("Using {} trainer backend", self.trainer.name());
        let job = TrainingJob::new(&self.config, dataset_path, output_dir.to_path_buf());
        let trainer_logs = self.trainer.train(&job).await?;

        note(&mut progress, "Training finished.".to_string());

        let mut logs = progress.join("\n");
        if !trainer_logs.trim().is_empty() {
            logs.push('\n');
            logs.push_str(trainer_logs.trim_end());
        }

        Ok(TrainingReport {
            output_dir: output_dir.to_path_buf(),
            token_count: prepared.token_count,
            block_count: prepared.dataset.len(),
            dropped_tokens: prepared.dropped_tokens(),
            logs,
        })
    }
}

fn note(progress: &mut Vec<String>, message: String) {
    tracing::info!("{}", message);
    progress.push(message);
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::core::config::HubConfig;
    use crate::tokenizer::test_support::write_word_level;
    use crate::tokenizer::HubClient;

    #[derive(Default)]
    struct RecordingTrainer {
        jobs: Mutex<Vec<TrainingJob>>,
    }

    #[async_trait]
    impl TrainerBackend for RecordingTrainer {
        fn name(&self) -> &str {
            "recording"
        }

        async fn train(&self, job: &TrainingJob) -> Result<String, TrainingError> {
            self.jobs.lock().unwrap().push(job.clone());
            Ok("epoch 1 done\n".to_string())
        }
    }

    fn pipeline(base_model: &Path, block_size: i64, trainer: Arc<RecordingTrainer>) -> TrainingPipeline {
        let hub = HubClient::new(&HubConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            download_timeout_secs: 1,
        })
        .unwrap();
        let config = TrainingConfig {
            block_size,
            base_model: base_model.to_string_lossy().to_string(),
            ..TrainingConfig::default()
        };
        TrainingPipeline::new(
            config,
            PdfExtractor::new(),
            TokenizerStore::new(base_model.join("cache"), hub),
            trainer,
        )
    }

    #[tokio::test]
    async fn writes_artifacts_and_hands_job_to_trainer() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base");
        write_word_level(&base);
        let trainer = Arc::new(RecordingTrainer::default());
        let out = dir.path().join("models").join("cats");

        let report = pipeline(&base, 2, trainer.clone())
            .run_text("the cat sat on the", &out)
            .await
            .unwrap();

        assert_eq!(report.token_count, 5);
        assert_eq!(report.block_count, 2);
        assert_eq!(report.dropped_tokens, 1);
        assert!(report.logs.contains("Training finished."));
        assert!(report.logs.ends_with("epoch 1 done"));
        assert_eq!(
            std::fs::read_to_string(out.join(TEXT_FILE)).unwrap(),
            "the cat sat on the"
        );
        assert!(out.join("dataset.json").is_file());
        assert!(out.join("tokenizer.json").is_file());

        let jobs = trainer.jobs.lock().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].output_dir, out);
        assert_eq!(jobs[0].dataset_path, out.join("dataset.json"));
    }

    #[tokio::test]
    async fn text_shorter_than_a_block_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base");
        write_word_level(&base);
        let trainer = Arc::new(RecordingTrainer::default());

        let err = pipeline(&base, 128, trainer.clone())
            .run_text("the cat", &dir.path().join("out"))
            .await
            .unwrap_err();

        assert!(matches!(err, TrainingError::EmptyDataset { tokens: 2, block_size: 128 }));
        assert!(trainer.jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn block_size_override_applies_to_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base");
        write_word_level(&base);
        let trainer = Arc::new(RecordingTrainer::default());

        let report = pipeline(&base, 128, trainer.clone())
            .with_block_size(3)
            .run_text("the cat sat on the mat", &dir.path().join("out"))
            .await
            .unwrap();

        assert_eq!(report.block_count, 2);
        assert_eq!(report.dropped_tokens, 0);
        assert_eq!(trainer.jobs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_positive_block_size_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base");
        write_word_level(&base);

        let err = pipeline(&base, -1, Arc::new(RecordingTrainer::default()))
            .run_text("the cat", &dir.path().join("out"))
            .await
            .unwrap_err();

        assert!(matches!(err, TrainingError::Dataset(_)));
    }
}
