//! Error types for tabula client operations.

use crate::transport::Method;
use std::io;
use thiserror::Error;

/// The error type for tabula client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The server answered with a payload that could not be parsed.
    #[error(transparent)]
    Query(#[from] tabula_query::Error),

    /// The server rejected the request.
    #[error("{method} {url} failed with status {status}: {message}")]
    Api {
        /// Full request URL, query string included.
        url: String,
        /// Request method.
        method: Method,
        /// HTTP status code.
        status: u16,
        /// Error message reported by the server.
        message: String,
    },

    /// The request could not be delivered.
    #[error("Transport error: {0}")]
    Transport(String),

    /// `send_requests` was called with nothing queued.
    #[error("No requests queued")]
    EmptyBatch,
}

/// A specialized Result type for tabula operations.
pub type Result<T> = std::result::Result<T, Error>;
