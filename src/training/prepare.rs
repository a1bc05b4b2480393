use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::TrainingError;
use crate::dataset::{window, BlockDataset};
use crate::tokenizer::TextTokenizer;

pub const DATASET_FILE: &str = "dataset.json";
pub const TEXT_FILE: &str = "train.txt";

#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub dataset: BlockDataset,
    /// Length of the tokenized text before windowing.
    pub token_count: usize,
}

impl PreparedDataset {
    /// Tokens in the trailing partial block that training never sees.
    pub fn dropped_tokens(&self) -> usize {
        self.token_count - self.dataset.token_count()
    }
}

pub fn prepare_dataset(
    text: &str,
    tokenizer: &TextTokenizer,
    block_size: usize,
) -> Result<PreparedDataset, TrainingError> {
    let tokens = tokenizer.encode(text)?;
    let dataset = window(&tokens, block_size)?;
    Ok(PreparedDataset {
        dataset,
        token_count: tokens.len(),
    })
}

/// Writes `dataset.json` (`{block_size, count, blocks}`) into `dir`.
pub fn write_dataset(dataset: &BlockDataset, dir: &Path) -> Result<PathBuf, TrainingError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(DATASET_FILE);
    let file = fs::File::create(&path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, dataset)?;
    writer.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::IndexedDataset;
    use crate::tokenizer::test_support::word_level;

    #[test]
    fn prepares_blocks_and_counts_dropped_tokens() {
        let tokenizer = word_level();

        let prepared = prepare_dataset("the cat sat on the mat", &tokenizer, 4).unwrap();

        assert_eq!(prepared.token_count, 6);
        assert_eq!(prepared.dataset.count(), 1);
        assert_eq!(prepared.dataset.get(0), Some(&[1, 2, 3, 4][..]));
        assert_eq!(prepared.dropped_tokens(), 2);
    }

    #[test]
    fn zero_block_size_is_rejected() {
        let tokenizer = word_level();
        let err = prepare_dataset("the cat", &tokenizer, 0).unwrap_err();
        assert!(matches!(err, TrainingError::Dataset(_)));
    }

    #[test]
    fn writes_dataset_json() {
        let tokenizer = word_level();
        let prepared = prepare_dataset("the cat sat on", &tokenizer, 2).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let path = write_dataset(&prepared.dataset, dir.path()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["count"], 2);
        assert_eq!(value["blocks"], serde_json::json!([[1, 2], [3, 4]]));
    }
}
