//! High level entry point: builds request paths, sends them through a
//! [`Transport`] and parses the bodies into typed responses.
//!
//! ```rust
//! use async_trait::async_trait;
//! use std::collections::BTreeMap;
//! use tabula::{Client, ClientConfig, Transport};
//! use tabula_query::{Filterable, Query, Response};
//!
//! /// Answers every read with one canned row.
//! struct OneRow;
//!
//! #[async_trait]
//! impl Transport for OneRow {
//!     async fn get(&self, _path: &str, _params: &BTreeMap<String, String>) -> tabula::Result<String> {
//!         Ok(r#"{"version":"3","status":"ok","response":{"included_rows":1,"data":[{"name":"Cafe"}]}}"#.into())
//!     }
//!
//!     async fn post(&self, path: &str, params: &BTreeMap<String, String>) -> tabula::Result<String> {
//!         self.get(path, params).await
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> tabula::Result<()> {
//! let client = Client::new(OneRow, ClientConfig::new("my-key"));
//!
//! let mut query = Query::new();
//! query.search("cafe").limit(1);
//! query.field("region").equal("CA");
//!
//! let response = client.fetch("places", &query).await?;
//! assert_eq!(response.status(), "ok");
//! assert_eq!(response.map_strings("name"), vec![Some("Cafe".to_string())]);
//! # Ok(())
//! # }
//! ```

use crate::batch::{MULTI_PATH, PendingRequest, RequestQueue};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::transport::Transport;
use std::collections::BTreeMap;
use tabula_query::{
    BatchResponse, FacetQuery, FacetResponse, FlagProblem, FlagResponse, Geocode, Geopulse,
    Metadata, Point, Query, ReadResponse, ResolveQuery, ResponseKind, Row, SchemaResponse, Submit,
    SubmitResponse, keys, url,
};
use tracing::{debug, info};

/// Table resolve requests go to when none is named.
pub const DEFAULT_RESOLVE_TABLE: &str = "places";

fn read_path(table: &str) -> String {
    format!("t/{table}")
}

fn facets_path(table: &str) -> String {
    format!("t/{table}/facets")
}

fn schema_path(table: &str) -> String {
    format!("t/{table}/schema")
}

fn resolve_path(table: &str) -> String {
    format!("{table}/resolve")
}

fn submit_path(table: &str, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("t/{table}/{id}/submit"),
        None => format!("t/{table}/submit"),
    }
}

fn flag_path(table: &str, id: &str) -> String {
    format!("t/{table}/{id}/flag")
}

const GEOCODE_PATH: &str = "places/geocode";
const GEOPULSE_PATH: &str = "places/geopulse";
const MONETIZE_PATH: &str = "places/monetize";

/// API client over a transport.
///
/// Reads take `&self`. Queueing and [`Client::send_requests`] take
/// `&mut self`, since the pending batch is owned by the client.
#[derive(Debug)]
pub struct Client<T> {
    transport: T,
    config: ClientConfig,
    queue: RequestQueue,
}

impl<T: Transport> Client<T> {
    /// Creates a client.
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            queue: RequestQueue::new(),
        }
    }

    /// The transport requests are sent through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn log_request(&self, method: &str, path: &str, params: &BTreeMap<String, String>) {
        if self.config.debug {
            info!(
                method,
                url = %self.config.url_for(&url::to_url(path, params)),
                "sending request"
            );
        } else {
            debug!(method, path, params = params.len(), "sending request");
        }
    }

    async fn get(&self, path: &str, params: &BTreeMap<String, String>) -> Result<String> {
        self.log_request("GET", path, params);
        self.transport.get(path, params).await
    }

    async fn post(&self, path: &str, params: &BTreeMap<String, String>) -> Result<String> {
        self.log_request("POST", path, params);
        self.transport.post(path, params).await
    }

    /// Reads rows of `table` matching `query`.
    ///
    /// # Errors
    ///
    /// Returns the transport's error, or `Error::Query` if the body is
    /// malformed.
    pub async fn fetch(&self, table: &str, query: &Query) -> Result<ReadResponse> {
        let body = self.get(&read_path(table), &query.to_request_params()).await?;
        Ok(ReadResponse::parse(body)?)
    }

    /// Counts values of the faceted fields of `table`.
    ///
    /// # Errors
    ///
    /// Returns the transport's error, or `Error::Query` if the body is
    /// malformed.
    pub async fn fetch_facets(&self, table: &str, query: &FacetQuery) -> Result<FacetResponse> {
        let body = self.get(&facets_path(table), &query.to_request_params()).await?;
        Ok(FacetResponse::parse(body)?)
    }

    /// Resolves a partial record against `table`.
    ///
    /// # Errors
    ///
    /// Returns the transport's error, or `Error::Query` if the body is
    /// malformed.
    pub async fn fetch_resolve(&self, table: &str, query: &ResolveQuery) -> Result<ReadResponse> {
        let body = self.get(&resolve_path(table), &query.to_request_params()).await?;
        Ok(ReadResponse::parse(body)?)
    }

    /// Resolves against the places table and returns the best match.
    ///
    /// # Errors
    ///
    /// Same as [`Client::fetch_resolve`].
    pub async fn resolve(&self, query: &ResolveQuery) -> Result<Option<Row>> {
        let response = self.fetch_resolve(DEFAULT_RESOLVE_TABLE, query).await?;
        Ok(response.into_rows().into_iter().next())
    }

    /// Fetches the schema of `table`.
    ///
    /// # Errors
    ///
    /// Returns the transport's error, or `Error::Query` if the body is
    /// malformed.
    pub async fn schema(&self, table: &str) -> Result<SchemaResponse> {
        let body = self.get(&schema_path(table), &BTreeMap::new()).await?;
        Ok(SchemaResponse::parse(body)?)
    }

    /// Reverse geocodes `point`.
    ///
    /// # Errors
    ///
    /// Returns the transport's error, or `Error::Query` if the body is
    /// malformed.
    pub async fn geocode(&self, point: &Point) -> Result<ReadResponse> {
        let params = Geocode::new(point).to_request_params();
        let body = self.get(GEOCODE_PATH, &params).await?;
        Ok(ReadResponse::parse(body)?)
    }

    /// Summarizes the neighbourhood around a point.
    ///
    /// # Errors
    ///
    /// Returns the transport's error, or `Error::Query` if the body is
    /// malformed.
    pub async fn geopulse(&self, query: &Geopulse) -> Result<ReadResponse> {
        let body = self.get(GEOPULSE_PATH, &query.to_request_params()).await?;
        Ok(ReadResponse::parse(body)?)
    }

    /// Reads deals and offers matching `query`.
    ///
    /// # Errors
    ///
    /// Returns the transport's error, or `Error::Query` if the body is
    /// malformed.
    pub async fn monetize(&self, query: &Query) -> Result<ReadResponse> {
        let body = self.get(MONETIZE_PATH, &query.to_request_params()).await?;
        Ok(ReadResponse::parse(body)?)
    }

    /// Submits a new row to `table`.
    ///
    /// # Errors
    ///
    /// Returns the transport's error, or `Error::Query` if the body is
    /// malformed.
    pub async fn submit(
        &self,
        table: &str,
        submit: &Submit,
        metadata: &Metadata,
    ) -> Result<SubmitResponse> {
        self.send_submit(submit_path(table, None), submit, metadata)
            .await
    }

    /// Submits changes to the existing row `id` of `table`.
    ///
    /// # Errors
    ///
    /// Returns the transport's error, or `Error::Query` if the body is
    /// malformed.
    pub async fn submit_to(
        &self,
        table: &str,
        id: &str,
        submit: &Submit,
        metadata: &Metadata,
    ) -> Result<SubmitResponse> {
        self.send_submit(submit_path(table, Some(id)), submit, metadata)
            .await
    }

    async fn send_submit(
        &self,
        path: String,
        submit: &Submit,
        metadata: &Metadata,
    ) -> Result<SubmitResponse> {
        let mut params = metadata.to_request_params();
        params.extend(submit.to_request_params());
        let body = self.post(&path, &params).await?;
        Ok(SubmitResponse::parse(body)?)
    }

    /// Reports a problem with row `id` of `table`.
    ///
    /// # Errors
    ///
    /// Returns the transport's error, or `Error::Query` if the body is
    /// malformed.
    pub async fn flag(
        &self,
        table: &str,
        id: &str,
        problem: FlagProblem,
        metadata: &Metadata,
    ) -> Result<FlagResponse> {
        let mut params = metadata.to_request_params();
        params.insert(keys::PROBLEM.to_string(), problem.to_string());
        let body = self.post(&flag_path(table, id), &params).await?;
        Ok(FlagResponse::parse(body)?)
    }

    /// Issues a GET for an arbitrary path and returns the body unparsed.
    ///
    /// # Errors
    ///
    /// Returns the transport's error.
    pub async fn raw_get(&self, path: &str, params: &BTreeMap<String, String>) -> Result<String> {
        self.get(path, params).await
    }

    fn enqueue(&mut self, path: impl Into<String>, params: BTreeMap<String, String>, kind: ResponseKind) {
        self.queue.push(PendingRequest::new(path, params, kind));
    }

    /// Queues a read of `table` for the next batch.
    pub fn queue_fetch(&mut self, table: &str, query: &Query) {
        self.enqueue(read_path(table), query.to_request_params(), ResponseKind::Read);
    }

    /// Queues a facet count of `table` for the next batch.
    pub fn queue_facets(&mut self, table: &str, query: &FacetQuery) {
        self.enqueue(facets_path(table), query.to_request_params(), ResponseKind::Facet);
    }

    /// Queues a resolve against `table` for the next batch.
    pub fn queue_resolve(&mut self, table: &str, query: &ResolveQuery) {
        self.enqueue(resolve_path(table), query.to_request_params(), ResponseKind::Read);
    }

    /// Queues a schema read of `table` for the next batch.
    pub fn queue_schema(&mut self, table: &str) {
        self.enqueue(schema_path(table), BTreeMap::new(), ResponseKind::Schema);
    }

    /// Queues a reverse geocode for the next batch.
    pub fn queue_geocode(&mut self, point: &Point) {
        self.enqueue(GEOCODE_PATH, Geocode::new(point).to_request_params(), ResponseKind::Read);
    }

    /// Queues a geopulse for the next batch.
    pub fn queue_geopulse(&mut self, query: &Geopulse) {
        self.enqueue(GEOPULSE_PATH, query.to_request_params(), ResponseKind::Read);
    }

    /// Queues a GET of an arbitrary path; its sub-response is kept raw.
    pub fn queue_raw(&mut self, path: &str, params: BTreeMap<String, String>) {
        self.enqueue(path, params, ResponseKind::Raw);
    }

    /// Requests queued for the next batch.
    pub fn pending(&self) -> &RequestQueue {
        &self.queue
    }

    /// Sends every queued request in one round trip.
    ///
    /// The queue is drained before sending, so it is empty afterwards even if
    /// the request fails.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyBatch` if nothing is queued, the transport's
    /// error, or `Error::Query` if the body or a sub-payload is malformed.
    pub async fn send_requests(&mut self) -> Result<BatchResponse> {
        if self.queue.is_empty() {
            return Err(Error::EmptyBatch);
        }
        let batch = self.queue.drain();
        let body = self.get(MULTI_PATH, &batch.to_request_params()).await?;
        Ok(batch.parse_response(body)?)
    }
}
