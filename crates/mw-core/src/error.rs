use thiserror::Error;

#[derive(Error, Debug)]
pub enum MwError {
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Duplicate group not found: {id}")]
    UnknownGroup { id: String },
    #[error("Invalid merge: {0}")]
    InvalidMerge(String),
    #[error("Background task failed: {0}")]
    Task(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, MwError>;
