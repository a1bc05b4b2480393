pub mod error;
pub mod window;

pub use error::DatasetError;
pub use window::{block_size_from_i64, window, BlockDataset, IndexedDataset};
