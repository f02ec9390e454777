//! Error types for the digit classification pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Ragged row: expected {expected} feature columns, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unknown label at prediction time: {0}")]
    UnknownLabel(i64),

    #[error("Invalid solver label: expected -1 or +1, got {0}")]
    NonBinaryLabel(f64),

    #[error("Model file error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
