//! Error type
use thiserror::Error;

/// Error from constructing or running an estimator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EstimatorError {
    #[error("unsupported baseline type {0:?}")]
    UnsupportedBaseline(String),
    #[error("task loss must have shape [BATCH]; got {shape:?}")]
    LossShape { shape: Vec<i64> },
}
