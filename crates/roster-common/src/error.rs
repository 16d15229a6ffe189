//! Error types shared across Roster crates

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, RosterError>;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl RosterError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
