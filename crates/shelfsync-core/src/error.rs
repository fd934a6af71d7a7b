use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The scan root is missing, not a directory, or unreadable.
    #[error("Cannot scan {}: {reason}", path.display())]
    RootInaccessible { path: PathBuf, reason: String },

    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Extraction pool error: {0}")]
    Pool(String),

    #[error("{0}")]
    Other(String),
}
