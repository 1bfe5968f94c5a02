//! Application level error type for replika

use crate::concurrency::CompositeFailure;

#[derive(Debug, thiserror::Error)]
pub enum ReplikaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid base64 docker config: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Image list error: {path}: {source}")]
    ImageList {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Replication failed: {0}")]
    Replication(#[from] CompositeFailure),
}

pub type Result<T> = std::result::Result<T, ReplikaError>;
