use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModexError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("File collection failed: {0}")]
    Collect(#[from] ignore::Error),
    #[error("Watcher error: {0}")]
    Watch(#[from] notify::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tokio::task::JoinError> for ModexError {
    fn from(err: tokio::task::JoinError) -> Self {
        ModexError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ModexError>;
