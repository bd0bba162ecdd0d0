use thiserror::Error;

/// Errors raised while reading an externally supplied span sequence
#[derive(Debug, Error, PartialEq)]
pub enum DiffError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
