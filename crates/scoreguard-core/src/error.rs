//! Error types for the Scoreguard core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum ScoreguardError {
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Malformed session: {0}")]
    MalformedSession(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for ScoreguardError {
    fn from(e: toml::de::Error) -> Self {
        ScoreguardError::InvalidConfig(e.to_string())
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, ScoreguardError>;
