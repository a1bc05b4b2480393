pub mod pipeline;
pub mod prepare;
pub mod trainer;

use thiserror::Error;

use crate::core::process::ProcessError;
use crate::dataset::DatasetError;
use crate::pdf::PdfError;
use crate::tokenizer::TokenizerError;

pub use pipeline::{TrainingPipeline, TrainingReport};
pub use prepare::{prepare_dataset, write_dataset, PreparedDataset, DATASET_FILE, TEXT_FILE};
pub use trainer::{ProcessTrainer, TrainerBackend, TrainingJob};

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Error extracting text: {0}")]
    Pdf(#[from] PdfError),
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("no training blocks: {tokens} tokens is less than one block of {block_size}")]
    EmptyDataset { tokens: usize, block_size: usize },
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("trainer exited unsuccessfully")]
    TrainerFailed { logs: String },
    #[error("failed to write dataset: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrainingError {
    /// Output worth showing alongside the error, if any.
    pub fn logs(&self) -> Option<&str> {
        match self {
            TrainingError::TrainerFailed { logs } => Some(logs),
            _ => None,
        }
    }
}
