pub mod core;
pub mod dataset;
pub mod llm;
pub mod models;
pub mod pdf;
pub mod probe;
pub mod server;
pub mod state;
pub mod tokenizer;
pub mod training;

pub use dataset::{window, BlockDataset, DatasetError, IndexedDataset};
