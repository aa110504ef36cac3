//! Response envelope and payload parsers.
//!
//! Every response shares one envelope:
//!
//! ```text
//! {"version": "3", "status": "ok",
//!  "response": {"total_row_count": 100, "included_rows": 2, "data": [...]}}
//! ```
//!
//! `version` and `status` are required. A `status` other than `"ok"` is
//! returned as data, not raised, and such a payload may omit `response`
//! entirely; the typed parsers then yield an empty payload. `total_row_count` is optional and maps to
//! `None` when absent; `included_rows` defaults to zero. Each response kind
//! then decodes its own payload from under `response`.

mod batch;
mod schema;

pub use batch::BatchResponse;
pub use schema::{ColumnSchema, SchemaResponse};

use crate::error::{Error, Result};
use crate::keys;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::trace;

/// A JSON object row.
pub type Row = Map<String, Value>;

/// Metadata common to every response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    version: String,
    status: String,
    total_row_count: Option<u64>,
    included_rows: u64,
}

impl Envelope {
    /// Parses only the envelope of a raw payload.
    ///
    /// # Errors
    ///
    /// Fails if the payload is not a JSON object or lacks `version` / `status`.
    pub fn parse(json: &str) -> Result<Self> {
        Self::from_root(&parse_root(json)?)
    }

    /// Extracts the envelope from an already parsed root object.
    ///
    /// # Errors
    ///
    /// Fails if `version` or `status` is missing, or if a row count is not a
    /// non-negative integer.
    pub fn from_root(root: &Row) -> Result<Self> {
        let version = scalar_string(root, keys::VERSION)?;
        let status = scalar_string(root, keys::STATUS)?;

        let (total_row_count, included_rows) = match root.get(keys::RESPONSE) {
            Some(Value::Object(response)) => (
                optional_count(response, keys::TOTAL_ROW_COUNT)?,
                optional_count(response, keys::INCLUDED_ROWS)?.unwrap_or(0),
            ),
            _ => (None, 0),
        };

        Ok(Self {
            version,
            status,
            total_row_count,
            included_rows,
        })
    }

    /// Version tag reported by the server, e.g. `"3"`.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Status reported by the server, e.g. `"ok"`.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns true if the status is `"ok"`.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// Total rows matching the request, `None` when the server did not count.
    #[must_use]
    pub fn total_row_count(&self) -> Option<u64> {
        self.total_row_count
    }

    /// Rows included in this response.
    #[must_use]
    pub fn included_rows(&self) -> u64 {
        self.included_rows
    }
}

/// Accessors shared by every parsed response.
pub trait Response {
    /// The parsed envelope.
    fn envelope(&self) -> &Envelope;

    /// The raw payload this response was parsed from.
    fn json(&self) -> &str;

    /// Status reported by the server.
    fn status(&self) -> &str {
        self.envelope().status()
    }

    /// Version tag reported by the server.
    fn version(&self) -> &str {
        self.envelope().version()
    }

    /// Total matching rows, `None` when unknown.
    fn total_row_count(&self) -> Option<u64> {
        self.envelope().total_row_count()
    }

    /// Rows included in this response.
    fn included_row_count(&self) -> u64 {
        self.envelope().included_rows()
    }

    /// Returns true if the response included no rows.
    fn is_empty(&self) -> bool {
        self.included_row_count() == 0
    }
}

pub(crate) fn parse_root(json: &str) -> Result<Row> {
    match serde_json::from_str::<Value>(json)? {
        Value::Object(root) => Ok(root),
        _ => Err(Error::unexpected("$", "object")),
    }
}

/// Reads a string field, accepting numbers as their textual form.
fn scalar_string(object: &Row, key: &str) -> Result<String> {
    match object.get(key) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(Value::Number(value)) => Ok(value.to_string()),
        Some(_) => Err(Error::unexpected(key, "string")),
        None => Err(Error::missing(key)),
    }
}

fn optional_count(response: &Row, key: &str) -> Result<Option<u64>> {
    match response.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            Error::unexpected(format!("response.{key}"), "non-negative integer")
        }),
    }
}

fn response_object(root: &Row) -> Result<&Row> {
    match root.get(keys::RESPONSE) {
        Some(Value::Object(response)) => Ok(response),
        Some(_) => Err(Error::unexpected(keys::RESPONSE, "object")),
        None => Err(Error::missing(keys::RESPONSE)),
    }
}

/// The `response` object, or `None` when a non-ok payload carries none.
pub(crate) fn payload<'a>(root: &'a Row, envelope: &Envelope) -> Result<Option<&'a Row>> {
    match root.get(keys::RESPONSE) {
        None if !envelope.is_ok() => Ok(None),
        _ => response_object(root).map(Some),
    }
}

/// `response.data`, or `None` when a non-ok payload omits it.
fn payload_data<'a>(root: &'a Row, envelope: &Envelope) -> Result<Option<&'a Value>> {
    let Some(response) = payload(root, envelope)? else {
        return Ok(None);
    };
    match response.get(keys::DATA) {
        Some(data) => Ok(Some(data)),
        None if !envelope.is_ok() => Ok(None),
        None => Err(Error::missing("response.data")),
    }
}

fn rows(data: &Value) -> Result<Vec<Row>> {
    let Value::Array(items) = data else {
        return Err(Error::unexpected("response.data", "array"));
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(row) => Ok(row.clone()),
            _ => Err(Error::unexpected(format!("response.data[{index}]"), "object")),
        })
        .collect()
}

/// Rows returned by a read, resolve, geocode or geopulse request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadResponse {
    json: String,
    envelope: Envelope,
    rows: Vec<Row>,
}

impl ReadResponse {
    /// Parses a read payload.
    ///
    /// # Errors
    ///
    /// Fails on invalid JSON, a missing envelope field, or a non-array
    /// `response.data`. `response.data` may only be absent when the status
    /// is not `"ok"`, in which case there are no rows.
    pub fn parse(json: impl Into<String>) -> Result<Self> {
        let json = json.into();
        let root = parse_root(&json)?;
        let envelope = Envelope::from_root(&root)?;
        let rows = match payload_data(&root, &envelope)? {
            Some(data) => rows(data)?,
            None => Vec::new(),
        };
        trace!(rows = rows.len(), status = envelope.status(), "parsed read response");
        Ok(Self {
            json,
            envelope,
            rows,
        })
    }

    /// Rows in server order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows actually decoded from `response.data`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the server included no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Response::is_empty(self)
    }

    /// The first row, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Consumes the response, returning its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// The value of `field` in every row, as text.
    ///
    /// Strings are returned unquoted, other values in JSON form, and absent
    /// or `null` fields as `None`.
    #[must_use]
    pub fn map_strings(&self, field: &str) -> Vec<Option<String>> {
        self.rows
            .iter()
            .map(|row| match row.get(field) {
                None | Some(Value::Null) => None,
                Some(Value::String(value)) => Some(value.clone()),
                Some(other) => Some(other.to_string()),
            })
            .collect()
    }
}

impl Response for ReadResponse {
    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn json(&self) -> &str {
        &self.json
    }
}

/// A response whose payload is not decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    json: String,
    envelope: Envelope,
}

impl RawResponse {
    /// Parses the envelope of any payload.
    ///
    /// # Errors
    ///
    /// Fails on invalid JSON or a missing envelope field.
    pub fn parse(json: impl Into<String>) -> Result<Self> {
        let json = json.into();
        let envelope = Envelope::parse(&json)?;
        Ok(Self { json, envelope })
    }
}

impl Response for RawResponse {
    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn json(&self) -> &str {
        &self.json
    }
}

/// Acknowledgement of a flag request.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagResponse {
    json: String,
    envelope: Envelope,
}

impl FlagResponse {
    /// Parses a flag acknowledgement.
    ///
    /// # Errors
    ///
    /// Fails on invalid JSON or a missing envelope field.
    pub fn parse(json: impl Into<String>) -> Result<Self> {
        let json = json.into();
        let envelope = Envelope::parse(&json)?;
        Ok(Self { json, envelope })
    }
}

impl Response for FlagResponse {
    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn json(&self) -> &str {
        &self.json
    }
}

/// Value counts per faceted field.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetResponse {
    json: String,
    envelope: Envelope,
    facets: BTreeMap<String, BTreeMap<String, u64>>,
}

impl FacetResponse {
    /// Parses a facet payload: `response.data` maps field to value to count.
    ///
    /// # Errors
    ///
    /// Fails on invalid JSON, a missing envelope field, or a `response.data`
    /// that is not an object of objects of counts. A non-ok payload without
    /// `response.data` has no facets.
    pub fn parse(json: impl Into<String>) -> Result<Self> {
        let json = json.into();
        let root = parse_root(&json)?;
        let envelope = Envelope::from_root(&root)?;

        let empty = Map::new();
        let fields = match payload_data(&root, &envelope)? {
            Some(Value::Object(fields)) => fields,
            Some(_) => return Err(Error::unexpected("response.data", "object")),
            None => &empty,
        };

        let mut facets = BTreeMap::new();
        for (field, buckets) in fields {
            let Value::Object(buckets) = buckets else {
                return Err(Error::unexpected(format!("response.data.{field}"), "object"));
            };
            let mut counts = BTreeMap::new();
            for (value, count) in buckets {
                let count = count.as_u64().ok_or_else(|| {
                    Error::unexpected(
                        format!("response.data.{field}.{value}"),
                        "non-negative integer",
                    )
                })?;
                counts.insert(value.clone(), count);
            }
            facets.insert(field.clone(), counts);
        }

        trace!(fields = facets.len(), "parsed facet response");
        Ok(Self {
            json,
            envelope,
            facets,
        })
    }

    /// All facets: field name to value to count.
    #[must_use]
    pub fn facets(&self) -> &BTreeMap<String, BTreeMap<String, u64>> {
        &self.facets
    }

    /// Value counts for one field.
    #[must_use]
    pub fn counts(&self, field: &str) -> Option<&BTreeMap<String, u64>> {
        self.facets.get(field)
    }
}

impl Response for FacetResponse {
    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn json(&self) -> &str {
        &self.json
    }
}

#[derive(Deserialize)]
struct SubmitPayload {
    factual_id: String,
    new_entity: bool,
}

/// Result of a submit request.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitResponse {
    json: String,
    envelope: Envelope,
    entity_id: Option<String>,
    new_entity: bool,
}

impl SubmitResponse {
    /// Parses a submit payload.
    ///
    /// # Errors
    ///
    /// Fails on invalid JSON, a missing envelope field, or a payload without
    /// `factual_id` / `new_entity`. A non-ok payload may omit `response`.
    pub fn parse(json: impl Into<String>) -> Result<Self> {
        let json = json.into();
        let root = parse_root(&json)?;
        let envelope = Envelope::from_root(&root)?;
        let (entity_id, new_entity) = match payload(&root, &envelope)? {
            Some(response) => {
                let payload: SubmitPayload =
                    serde_json::from_value(Value::Object(response.clone()))?;
                (Some(payload.factual_id), payload.new_entity)
            }
            None => (None, false),
        };
        Ok(Self {
            json,
            envelope,
            entity_id,
            new_entity,
        })
    }

    /// Identifier of the submitted row, `None` if the submit was rejected
    /// without one.
    #[must_use]
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Returns true if the submission created a new row.
    #[must_use]
    pub fn is_new_entity(&self) -> bool {
        self.new_entity
    }
}

impl Response for SubmitResponse {
    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn json(&self) -> &str {
        &self.json
    }
}

/// Which parser decodes a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// [`ReadResponse`]
    Read,
    /// [`FacetResponse`]
    Facet,
    /// [`SchemaResponse`]
    Schema,
    /// [`SubmitResponse`]
    Submit,
    /// [`FlagResponse`]
    Flag,
    /// [`RawResponse`]
    Raw,
}

impl ResponseKind {
    /// Short name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Facet => "facet",
            Self::Schema => "schema",
            Self::Submit => "submit",
            Self::Flag => "flag",
            Self::Raw => "raw",
        }
    }

    /// Parses `json` with the parser for this kind.
    ///
    /// # Errors
    ///
    /// Propagates the kind-specific parser's error.
    pub fn parse(self, json: impl Into<String>) -> Result<AnyResponse> {
        Ok(match self {
            Self::Read => AnyResponse::Read(ReadResponse::parse(json)?),
            Self::Facet => AnyResponse::Facet(FacetResponse::parse(json)?),
            Self::Schema => AnyResponse::Schema(SchemaResponse::parse(json)?),
            Self::Submit => AnyResponse::Submit(SubmitResponse::parse(json)?),
            Self::Flag => AnyResponse::Flag(FlagResponse::parse(json)?),
            Self::Raw => AnyResponse::Raw(RawResponse::parse(json)?),
        })
    }
}

/// A response of any kind, as produced by batch dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyResponse {
    /// Rows.
    Read(ReadResponse),
    /// Facet counts.
    Facet(FacetResponse),
    /// Table schema.
    Schema(SchemaResponse),
    /// Submit result.
    Submit(SubmitResponse),
    /// Flag acknowledgement.
    Flag(FlagResponse),
    /// Envelope only.
    Raw(RawResponse),
}

impl AnyResponse {
    /// The kind of the wrapped response.
    #[must_use]
    pub fn kind(&self) -> ResponseKind {
        match self {
            Self::Read(_) => ResponseKind::Read,
            Self::Facet(_) => ResponseKind::Facet,
            Self::Schema(_) => ResponseKind::Schema,
            Self::Submit(_) => ResponseKind::Submit,
            Self::Flag(_) => ResponseKind::Flag,
            Self::Raw(_) => ResponseKind::Raw,
        }
    }

    /// The wrapped read response, if this is one.
    #[must_use]
    pub fn as_read(&self) -> Option<&ReadResponse> {
        match self {
            Self::Read(response) => Some(response),
            _ => None,
        }
    }

    /// The wrapped facet response, if this is one.
    #[must_use]
    pub fn as_facet(&self) -> Option<&FacetResponse> {
        match self {
            Self::Facet(response) => Some(response),
            _ => None,
        }
    }

    /// The wrapped schema response, if this is one.
    #[must_use]
    pub fn as_schema(&self) -> Option<&SchemaResponse> {
        match self {
            Self::Schema(response) => Some(response),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn Response {
        match self {
            Self::Read(response) => response,
            Self::Facet(response) => response,
            Self::Schema(response) => response,
            Self::Submit(response) => response,
            Self::Flag(response) => response,
            Self::Raw(response) => response,
        }
    }
}

impl Response for AnyResponse {
    fn envelope(&self) -> &Envelope {
        self.inner().envelope()
    }

    fn json(&self) -> &str {
        self.inner().json()
    }
}
