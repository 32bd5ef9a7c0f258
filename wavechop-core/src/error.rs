use thiserror::Error;

/// All errors produced by wavechop-core.
#[derive(Debug, Error)]
pub enum ChopError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("invalid audio buffer: {0}")]
    InvalidBuffer(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ChopError>;
