//! Query construction and response parsing for a remote tabular data API.
//!
//! Queries accumulate typed parameters (full text search, paging, field
//! selection, sorting, geo circles and a tree of filter predicates) and
//! flatten them into the string parameter map a request is built from.
//! Responses are parsed from raw JSON text into typed views over the shared
//! envelope.
//!
//! ```
//! use tabula_query::{Circle, Filterable, Query};
//!
//! let mut query = Query::new();
//! query
//!     .search("coffee")
//!     .limit(10)
//!     .within(&Circle::new(34.06018, -118.41835, 5000));
//! query.field("rating").greater_than(4);
//!
//! let params = query.to_request_params();
//! assert_eq!(params["q"], "coffee");
//! assert_eq!(params["filters"], r#"{"rating":{"$gt":4}}"#);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod error;
pub mod filter_tree;
pub mod geo;
pub mod keys;
pub mod params;
pub mod predicate;
pub mod query;
pub mod response;
pub mod submit;
pub mod url;

pub use builder::{FieldBuilder, Filterable};
pub use error::{Error, Result};
pub use filter_tree::FilterTree;
pub use geo::{Circle, Point};
pub use params::{ParamValue, ParameterBag};
pub use predicate::{FilterNode, Logic, Operator, Predicate, PredicateGroup};
pub use query::{FacetQuery, Geocode, Geopulse, Query, ResolveQuery};
pub use response::{
    AnyResponse, BatchResponse, ColumnSchema, Envelope, FacetResponse, FlagResponse, RawResponse,
    ReadResponse, Response, ResponseKind, Row, SchemaResponse, SubmitResponse,
};
pub use submit::{FlagProblem, Metadata, Submit};
