//! Wire names of request parameters and response fields.

/// Filter tree parameter.
pub const FILTERS: &str = "filters";
/// Geographic constraint parameter.
pub const GEO: &str = "geo";
/// Full text search parameter.
pub const SEARCH: &str = "q";
/// Row count request flag.
pub const INCLUDE_COUNT: &str = "include_count";
/// Page size; also the per-facet value cap on facet queries.
pub const LIMIT: &str = "limit";
/// Page offset.
pub const OFFSET: &str = "offset";
/// Ordered sort list.
pub const SORT: &str = "sort";
/// Selected fields.
pub const SELECT: &str = "select";
/// Minimum count per facet value.
pub const MIN_COUNT: &str = "min_count";
/// Resolve and submit values object.
pub const VALUES: &str = "values";
/// Batched sub-request map.
pub const QUERIES: &str = "queries";
/// Flag problem type.
pub const PROBLEM: &str = "problem";

/// Metadata: submitting user.
pub const USER: &str = "user";
/// Metadata: explanatory comment.
pub const COMMENT: &str = "comment";
/// Metadata: source reference.
pub const REFERENCE: &str = "reference";
/// Metadata: test-only request.
pub const DEBUG: &str = "debug";

/// Response: status field.
pub const STATUS: &str = "status";
/// Response: version field.
pub const VERSION: &str = "version";
/// Response: payload object.
pub const RESPONSE: &str = "response";
/// Response: total matching rows.
pub const TOTAL_ROW_COUNT: &str = "total_row_count";
/// Response: rows included in this page.
pub const INCLUDED_ROWS: &str = "included_rows";
/// Response: rows or facet buckets.
pub const DATA: &str = "data";
