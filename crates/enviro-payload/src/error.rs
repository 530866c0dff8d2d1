use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("insufficient data: expected at least {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("unsupported command: {0}")]
    UnsupportedCommand(u8),

    #[error("json serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PayloadError>;
