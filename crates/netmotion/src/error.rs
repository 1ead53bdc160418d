//! Error handling for the netmotion binary.

use std::{io, result};

use thiserror::Error;

/// Convenient result type for netmotion commands.
pub type Result<T> = result::Result<T, Error>;

/// Errors that end a netmotion command.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Settings could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] config::Error),
    /// Profiles could not be rendered as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The destination of `send` resolved to no address.
    #[error("No address found for {0}")]
    Unresolved(String),
}

impl Error {
    /// Render for the terminal; settings errors include their excerpt.
    pub fn pretty(&self) -> String {
        match self {
            Self::Config(e) => e.pretty(),
            other => other.to_string(),
        }
    }
}
