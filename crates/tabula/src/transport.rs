//! The seam between request construction and the network.
//!
//! A [`Transport`] receives a path relative to the API root and the flattened
//! parameter map, performs the request, and returns the raw response body.
//! Signing, headers and connection handling belong to the implementation.
//! A rejected request is reported as [`Error::Api`](crate::error::Error::Api).
//!
//! # Test Utilities
//!
//! [`MockTransport`] replays canned bodies per path and records every call.
//! It is available in this crate's tests and, for downstream crates, behind
//! the `test-util` feature:
//!
//! ```toml
//! [dev-dependencies]
//! tabula = { version = "...", features = ["test-util"] }
//! ```

use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;

/// Request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Reads.
    Get,
    /// Submits and flags.
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
        })
    }
}

/// Performs requests against the API.
///
/// Implementations must be `Send + Sync` so a client can be moved into async
/// tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET for `path` with `params` as the query string.
    ///
    /// # Errors
    ///
    /// Returns `Error::Api` when the server rejects the request and
    /// `Error::Transport` when it cannot be delivered.
    async fn get(&self, path: &str, params: &BTreeMap<String, String>) -> Result<String>;

    /// Issues a POST for `path` with `params`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Api` when the server rejects the request and
    /// `Error::Transport` when it cannot be delivered.
    async fn post(&self, path: &str, params: &BTreeMap<String, String>) -> Result<String>;
}

#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockTransport, RecordedCall};

#[cfg(any(test, feature = "test-util"))]
mod mock {
    use super::{Method, Transport};
    use crate::error::{Error, Result};
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashMap};
    use tokio::sync::Mutex;

    /// One request seen by [`MockTransport`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedCall {
        /// Request method.
        pub method: Method,
        /// Path relative to the API root.
        pub path: String,
        /// Flattened parameters.
        pub params: BTreeMap<String, String>,
    }

    #[derive(Debug, Clone)]
    enum Canned {
        Body(String),
        Rejected { status: u16, message: String },
    }

    /// Transport that replays canned bodies keyed by path.
    ///
    /// A path with no canned reply is rejected with status 404.
    #[derive(Debug, Default)]
    pub struct MockTransport {
        replies: HashMap<String, Canned>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockTransport {
        /// Creates a transport with no canned replies.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Answers requests for `path` with `body`.
        #[must_use]
        pub fn with_response(mut self, path: impl Into<String>, body: impl Into<String>) -> Self {
            self.replies.insert(path.into(), Canned::Body(body.into()));
            self
        }

        /// Rejects requests for `path` with `status` and `message`.
        #[must_use]
        pub fn with_rejection(
            mut self,
            path: impl Into<String>,
            status: u16,
            message: impl Into<String>,
        ) -> Self {
            self.replies.insert(
                path.into(),
                Canned::Rejected {
                    status,
                    message: message.into(),
                },
            );
            self
        }

        /// Every call made so far, in order.
        pub async fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().await.clone()
        }

        /// The most recent call, if any.
        pub async fn last_call(&self) -> Option<RecordedCall> {
            self.calls.lock().await.last().cloned()
        }

        async fn reply(
            &self,
            method: Method,
            path: &str,
            params: &BTreeMap<String, String>,
        ) -> Result<String> {
            self.calls.lock().await.push(RecordedCall {
                method,
                path: path.to_string(),
                params: params.clone(),
            });

            let rejected = |status, message: &str| Error::Api {
                url: tabula_query::url::to_url(path, params),
                method,
                status,
                message: message.to_string(),
            };
            match self.replies.get(path) {
                Some(Canned::Body(body)) => Ok(body.clone()),
                Some(Canned::Rejected { status, message }) => Err(rejected(*status, message)),
                None => Err(rejected(404, "no canned response")),
            }
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn get(&self, path: &str, params: &BTreeMap<String, String>) -> Result<String> {
            self.reply(Method::Get, path, params).await
        }

        async fn post(&self, path: &str, params: &BTreeMap<String, String>) -> Result<String> {
            self.reply(Method::Post, path, params).await
        }
    }
}
