//! Query-string rendering of flattened parameter maps.
//!
//! Keys are written verbatim; values are percent-encoded, leaving only the
//! RFC 3986 unreserved characters intact. Pairs follow the map's key order.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::collections::BTreeMap;

const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes a single query value.
#[must_use]
pub fn encode_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Renders `key=value&...` with encoded values.
#[must_use]
pub fn to_url_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={}", encode_value(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Renders `key=value&...` without encoding, for display and logging.
#[must_use]
pub fn to_decoded_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Joins a request path and its encoded query string.
#[must_use]
pub fn to_url(path: &str, params: &BTreeMap<String, String>) -> String {
    if params.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{}", to_url_query(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn encodes_json_values() {
        let query = to_url_query(&params(&[("filters", r#"{"a":{"$eq":"b c"}}"#)]));
        assert_eq!(query, "filters=%7B%22a%22%3A%7B%22%24eq%22%3A%22b%20c%22%7D%7D");
    }

    #[test]
    fn leaves_unreserved_characters() {
        assert_eq!(encode_value("a-b.c_d~e"), "a-b.c_d~e");
    }

    #[test]
    fn decoded_query_orders_by_key() {
        let query = to_decoded_query(&params(&[("q", "x"), ("limit", "10")]));
        assert_eq!(query, "limit=10&q=x");
    }

    #[test]
    fn url_without_params_is_bare_path() {
        assert_eq!(to_url("t/places", &BTreeMap::new()), "t/places");
        assert_eq!(to_url("t/places", &params(&[("limit", "1")])), "t/places?limit=1");
    }
}
