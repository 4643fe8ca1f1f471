//! Error types for compose-retag

use std::path::PathBuf;
use thiserror::Error;

/// Result type for compose-retag operations
pub type Result<T> = std::result::Result<T, RetagError>;

/// compose-retag error types
#[derive(Error, Debug)]
pub enum RetagError {
    #[error("Failed to read compose file {path}: {source}")]
    ComposeRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Compose file parse error: {0}")]
    ComposeParse(String),

    #[error("Compose file has no top-level 'services' mapping")]
    MissingServices,

    #[error("Service '{service}': {message}")]
    InvalidService { service: String, message: String },

    #[error("Failed to write compose file {path}: {source}")]
    ComposeWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}")]
    CommandFailed { command: String, status: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
