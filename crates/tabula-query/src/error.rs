//! Error types for tabula-query operations.
//!
//! Every variant describes a malformed response: the payload was not JSON, or
//! it was JSON without the envelope or payload shape its parser expects.
//! Query construction itself never fails.

use thiserror::Error;

/// The error type for response parsing.
#[derive(Debug, Error)]
pub enum Error {
    /// The payload was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field was absent.
    #[error("Missing field: {path}")]
    MissingField {
        /// Dotted path of the missing field, e.g. `response.data`.
        path: String,
    },

    /// A field was present but held the wrong JSON type.
    #[error("Unexpected type for {path}: expected {expected}")]
    UnexpectedType {
        /// Dotted path of the offending field.
        path: String,
        /// Description of the expected JSON type.
        expected: &'static str,
    },

    /// A batched response did not carry a payload for a queued sub-request.
    #[error("Missing sub-response for key {key}")]
    MissingSubResponse {
        /// The synthetic batch key (`q0`, `q1`, ...).
        key: String,
    },
}

impl Error {
    pub(crate) fn missing(path: impl Into<String>) -> Self {
        Self::MissingField { path: path.into() }
    }

    pub(crate) fn unexpected(path: impl Into<String>, expected: &'static str) -> Self {
        Self::UnexpectedType {
            path: path.into(),
            expected,
        }
    }
}

/// A specialized Result type for tabula-query operations.
pub type Result<T> = std::result::Result<T, Error>;
