use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Result type used throughout the server crate.
pub type Result<T> = StdResult<T, Error>;

/// Errors raised by the listener and its supervisor.
#[derive(Error, Debug)]
pub enum Error {
    /// The configured address could not be resolved or bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// `address:port` as configured.
        addr: String,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },

    /// A socket operation failed after binding.
    #[error("socket error: {0}")]
    Socket(#[from] io::Error),

    /// The listener thread or its runtime could not be created.
    #[error("listener runtime error: {0}")]
    Runtime(io::Error),
}
