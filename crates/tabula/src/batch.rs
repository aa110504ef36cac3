//! Queueing of read requests for a single batched round trip.
//!
//! Queued requests are drained in enqueue order and keyed `q0`, `q1`, ...
//! Each key maps to the request's path and encoded query string inside one
//! `queries` parameter sent to the `multi` endpoint. The response carries a
//! sub-payload under the same keys, which is decoded with the parser
//! recorded at enqueue time.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tabula_query::{BatchResponse, ResponseKind, keys, url};
use tracing::{debug, trace};

/// Path of the batch endpoint.
pub const MULTI_PATH: &str = "multi";

/// A read request waiting to be batched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    path: String,
    params: BTreeMap<String, String>,
    kind: ResponseKind,
}

impl PendingRequest {
    /// Creates a pending request whose response is decoded as `kind`.
    #[must_use]
    pub fn new(path: impl Into<String>, params: BTreeMap<String, String>, kind: ResponseKind) -> Self {
        Self {
            path: path.into(),
            params,
            kind,
        }
    }

    /// Path relative to the API root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Flattened parameters.
    #[must_use]
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Parser for this request's sub-response.
    #[must_use]
    pub fn kind(&self) -> ResponseKind {
        self.kind
    }

    /// Root-relative URL as embedded in the `queries` parameter.
    #[must_use]
    pub fn url(&self) -> String {
        format!("/{}", url::to_url(&self.path, &self.params))
    }
}

/// Requests queued for the next batch, in enqueue order.
#[derive(Debug, Clone, Default)]
pub struct RequestQueue {
    pending: Vec<PendingRequest>,
}

impl RequestQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request.
    pub fn push(&mut self, request: PendingRequest) {
        trace!(path = request.path(), kind = request.kind().as_str(), "queued request");
        self.pending.push(request);
    }

    /// Requests queued so far.
    #[must_use]
    pub fn pending(&self) -> &[PendingRequest] {
        &self.pending
    }

    /// Number of queued requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Empties the queue into a keyed batch.
    pub fn drain(&mut self) -> Batch {
        let entries: Vec<_> = std::mem::take(&mut self.pending)
            .into_iter()
            .enumerate()
            .map(|(index, request)| (format!("q{index}"), request))
            .collect();
        debug!(count = entries.len(), "drained request queue");
        Batch { entries }
    }
}

/// A drained queue with its batch keys assigned.
#[derive(Debug, Clone)]
pub struct Batch {
    entries: Vec<(String, PendingRequest)>,
}

impl Batch {
    /// Keyed requests in enqueue order.
    #[must_use]
    pub fn entries(&self) -> &[(String, PendingRequest)] {
        &self.entries
    }

    /// Number of requests in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the batch holds no request.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The parameter map for the `multi` request.
    #[must_use]
    pub fn to_request_params(&self) -> BTreeMap<String, String> {
        let queries: Map<String, Value> = self
            .entries
            .iter()
            .map(|(key, request)| (key.clone(), Value::String(request.url())))
            .collect();
        BTreeMap::from([(
            keys::QUERIES.to_string(),
            Value::Object(queries).to_string(),
        )])
    }

    /// `(key, kind)` pairs for dispatching the batched response.
    #[must_use]
    pub fn response_kinds(&self) -> Vec<(String, ResponseKind)> {
        self.entries
            .iter()
            .map(|(key, request)| (key.clone(), request.kind()))
            .collect()
    }

    /// Decodes the `multi` response body against this batch.
    ///
    /// # Errors
    ///
    /// Fails if the body is malformed or lacks a sub-payload for a key.
    pub fn parse_response(&self, body: impl Into<String>) -> tabula_query::Result<BatchResponse> {
        BatchResponse::parse(body, &self.response_kinds())
    }
}
