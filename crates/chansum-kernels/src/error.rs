use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChansumError {
    #[error("expected a {expected_ndim}-D array, got shape {got:?}")]
    InvalidShape { expected_ndim: usize, got: Vec<usize> },

    #[error("block size must be positive, got {0}")]
    InvalidBlockSize(usize),

    #[error("thread pool: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, ChansumError>;
