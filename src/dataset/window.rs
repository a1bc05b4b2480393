use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};

use super::error::DatasetError;

/// Read-only, index-addressable view over training examples.
///
/// Training loops sample examples by index, either sequentially or in a
/// shuffled order they manage themselves, so this is all a dataset exposes.
pub trait IndexedDataset {
    type Example: ?Sized;

    fn count(&self) -> usize;

    fn get(&self, index: usize) -> Option<&Self::Example>;
}

/// Fixed-length token blocks cut from one tokenized document.
///
/// Blocks are stored back to back in a single buffer. Block `i` covers
/// token offsets `[i * block_size, (i + 1) * block_size)` of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDataset {
    block_size: usize,
    tokens: Vec<u32>,
}

impl BlockDataset {
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn len(&self) -> usize {
        self.tokens.len() / self.block_size
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of tokens covered by all blocks together.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn block(&self, index: usize) -> Option<&[u32]> {
        let start = index.checked_mul(self.block_size)?;
        let end = start.checked_add(self.block_size)?;
        self.tokens.get(start..end)
    }

    pub fn iter(&self) -> std::slice::Chunks<'_, u32> {
        self.tokens.chunks(self.block_size)
    }
}

impl IndexedDataset for BlockDataset {
    type Example = [u32];

    fn count(&self) -> usize {
        self.len()
    }

    fn get(&self, index: usize) -> Option<&[u32]> {
        self.block(index)
    }
}

impl<'a> IntoIterator for &'a BlockDataset {
    type Item = &'a [u32];
    type IntoIter = std::slice::Chunks<'a, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Splits `tokens` into consecutive non-overlapping blocks of `block_size`.
///
/// Trailing tokens that do not fill a whole block are dropped. Input shorter
/// than one block gives an empty dataset.
pub fn window(tokens: &[u32], block_size: usize) -> Result<BlockDataset, DatasetError> {
    if block_size == 0 {
        return Err(DatasetError::InvalidArgument(
            "block_size must be positive".to_string(),
        ));
    }

    let kept = tokens.len() / block_size * block_size;

    Ok(BlockDataset {
        block_size,
        tokens: tokens[..kept].to_vec(),
    })
}

/// Converts a signed block size coming from configuration or a request.
pub fn block_size_from_i64(value: i64) -> Result<usize, DatasetError> {
    if value <= 0 {
        return Err(DatasetError::InvalidArgument(format!(
            "block_size must be positive, got {}",
            value
        )));
    }
    usize::try_from(value).map_err(|_| {
        DatasetError::InvalidArgument(format!("block_size {} does not fit in memory", value))
    })
}

struct Blocks<'a>(&'a BlockDataset);

impl Serialize for Blocks<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for block in self.0.iter() {
            seq.serialize_element(block)?;
        }
        seq.end()
    }
}

impl Serialize for BlockDataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BlockDataset", 3)?;
        state.serialize_field("block_size", &self.block_size)?;
        state.serialize_field("count", &self.len())?;
        state.serialize_field("blocks", &Blocks(self))?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(dataset: &BlockDataset) -> Vec<Vec<u32>> {
        dataset.iter().map(|b| b.to_vec()).collect()
    }

    #[test]
    fn drops_trailing_remainder() {
        let dataset = window(&[1, 2, 3, 4, 5], 2).unwrap();
        assert_eq!(blocks(&dataset), vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(dataset.count(), 2);
    }

    #[test]
    fn exact_multiple_keeps_everything() {
        let dataset = window(&[1, 2, 3, 4], 4).unwrap();
        assert_eq!(blocks(&dataset), vec![vec![1, 2, 3, 4]]);
    }

    #[test]
    fn empty_and_short_inputs_yield_no_blocks() {
        assert!(window(&[], 128).unwrap().is_empty());
        let short = window(&[7, 8, 9], 4).unwrap();
        assert_eq!(short.count(), 0);
        assert_eq!(short.get(0), None);
    }

    #[test]
    fn zero_block_size_is_invalid() {
        let err = window(&[1, 2, 3], 0).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidArgument(_)));
    }

    #[test]
    fn signed_block_sizes_are_checked() {
        assert!(matches!(
            block_size_from_i64(0),
            Err(DatasetError::InvalidArgument(_))
        ));
        assert!(matches!(
            block_size_from_i64(-1),
            Err(DatasetError::InvalidArgument(_))
        ));
        assert_eq!(block_size_from_i64(128).unwrap(), 128);
    }

    #[test]
    fn get_returns_block_at_offset() {
        let tokens: Vec<u32> = (0..10).collect();
        let dataset = window(&tokens, 3).unwrap();
        assert_eq!(dataset.get(0), Some(&[0, 1, 2][..]));
        assert_eq!(dataset.get(2), Some(&[6, 7, 8][..]));
        assert_eq!(dataset.get(3), None);
        assert_eq!(dataset.get(usize::MAX), None);
    }

    #[test]
    fn serializes_as_nested_blocks() {
        let dataset = window(&[1, 2, 3, 4, 5], 2).unwrap();
        let value = serde_json::to_value(&dataset).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"block_size": 2, "count": 2, "blocks": [[1, 2], [3, 4]]})
        );
    }
}
