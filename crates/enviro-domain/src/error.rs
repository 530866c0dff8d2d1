use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Payload decode error: {0}")]
    PayloadDecodeError(String),

    #[error("Sink error: {0}")]
    SinkError(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
