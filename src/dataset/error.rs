use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DatasetError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
