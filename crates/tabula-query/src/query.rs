//! Typed query façades over a [`ParameterBag`].
//!
//! Each façade owns one bag, is mutated through `&mut self` fluent calls, and
//! renders its outbound parameters with `to_request_params`. Rendering never
//! mutates, so a query may be rendered any number of times.

use crate::builder::Filterable;
use crate::filter_tree::FilterTree;
use crate::geo::{Circle, Point};
use crate::keys;
use crate::params::ParameterBag;
use crate::url;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Sets `key` to `value` when positive, otherwise clears it.
fn set_positive(params: &mut ParameterBag, key: &str, value: i64) {
    if value > 0 {
        params.set_literal(key, value.to_string());
    } else {
        params.remove(key);
    }
}

fn row_count_flag(include: bool) -> Option<ParameterBag> {
    include.then(|| {
        let mut extra = ParameterBag::new();
        extra.set_literal(keys::INCLUDE_COUNT, "true");
        extra
    })
}

/// A read query against a table.
///
/// ```
/// use tabula_query::{Circle, Filterable, Query};
///
/// let mut query = Query::new();
/// query
///     .search("coffee")
///     .within(&Circle::new(34.06021, -118.41828, 1000))
///     .sort_desc("$distance")
///     .sort_asc("name")
///     .limit(10);
/// query.field("tel").not_blank();
///
/// let params = query.to_request_params();
/// assert_eq!(params["sort"], "$distance:desc,name:asc");
/// assert_eq!(params["limit"], "10");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    params: ParameterBag,
    include_row_count: bool,
}

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the full text search term.
    pub fn search(&mut self, term: impl Into<String>) -> &mut Self {
        self.params.set_literal(keys::SEARCH, term);
        self
    }

    /// Sets the maximum number of rows. Non-positive values clear the limit.
    pub fn limit(&mut self, limit: i64) -> &mut Self {
        set_positive(&mut self.params, keys::LIMIT, limit);
        self
    }

    /// Sets the page offset. Non-positive values clear the offset.
    pub fn offset(&mut self, offset: i64) -> &mut Self {
        set_positive(&mut self.params, keys::OFFSET, offset);
        self
    }

    /// Selects which fields rows carry. Repeated fields are sent once.
    pub fn only<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            self.params.add_to_comma_set(keys::SELECT, field);
        }
        self
    }

    /// Fields selected with [`Query::only`], if any.
    #[must_use]
    pub fn select_fields(&self) -> Option<&[String]> {
        self.params.comma_values(keys::SELECT)
    }

    /// Appends an ascending sort on `field`.
    pub fn sort_asc(&mut self, field: &str) -> &mut Self {
        self.params
            .push_to_comma_list(keys::SORT, format!("{field}:asc"));
        self
    }

    /// Appends a descending sort on `field`.
    pub fn sort_desc(&mut self, field: &str) -> &mut Self {
        self.params
            .push_to_comma_list(keys::SORT, format!("{field}:desc"));
        self
    }

    /// Confines results to `circle`, replacing any earlier geo constraint.
    pub fn within(&mut self, circle: &Circle) -> &mut Self {
        self.params.set_json(keys::GEO, circle.to_json());
        self
    }

    /// Asks for the total matching row count in the response.
    pub fn include_row_count(&mut self, include: bool) -> &mut Self {
        self.include_row_count = include;
        self
    }

    /// The underlying parameters.
    #[must_use]
    pub fn params(&self) -> &ParameterBag {
        &self.params
    }

    /// Flattens this query into the outbound parameter map.
    #[must_use]
    pub fn to_request_params(&self) -> BTreeMap<String, String> {
        self.params
            .to_request_params(row_count_flag(self.include_row_count).as_ref())
    }

    /// Renders the percent-encoded query string.
    #[must_use]
    pub fn to_url_query(&self) -> String {
        url::to_url_query(&self.to_request_params())
    }
}

impl Filterable for Query {
    fn filter_tree_mut(&mut self) -> &mut FilterTree {
        self.params.filters_mut()
    }

    fn filter_tree(&self) -> Option<&FilterTree> {
        self.params.filters()
    }
}

/// Decoded `key=value&...` form, keys in sorted order.
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&url::to_decoded_query(&self.to_request_params()))
    }
}

/// A facet (value count) query against a table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FacetQuery {
    params: ParameterBag,
    include_row_count: bool,
}

impl FacetQuery {
    /// Creates a facet query over `fields`.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut params = ParameterBag::new();
        for field in fields {
            params.add_to_comma_set(keys::SELECT, field);
        }
        Self {
            params,
            include_row_count: false,
        }
    }

    /// Minimum row count a facet value needs to be returned.
    pub fn min_count_per_facet_value(&mut self, min_count: u64) -> &mut Self {
        self.params
            .set_literal(keys::MIN_COUNT, min_count.to_string());
        self
    }

    /// Maximum number of values returned per faceted field.
    pub fn max_values_per_facet(&mut self, max_values: u64) -> &mut Self {
        self.params.set_literal(keys::LIMIT, max_values.to_string());
        self
    }

    /// Sets the full text search term.
    pub fn search(&mut self, term: impl Into<String>) -> &mut Self {
        self.params.set_literal(keys::SEARCH, term);
        self
    }

    /// Confines counted rows to `circle`.
    pub fn within(&mut self, circle: &Circle) -> &mut Self {
        self.params.set_json(keys::GEO, circle.to_json());
        self
    }

    /// Asks for the total matching row count in the response.
    pub fn include_row_count(&mut self, include: bool) -> &mut Self {
        self.include_row_count = include;
        self
    }

    /// The faceted fields.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        self.params.comma_values(keys::SELECT).unwrap_or_default()
    }

    /// Flattens this query into the outbound parameter map.
    #[must_use]
    pub fn to_request_params(&self) -> BTreeMap<String, String> {
        self.params
            .to_request_params(row_count_flag(self.include_row_count).as_ref())
    }

    /// Renders the percent-encoded query string.
    #[must_use]
    pub fn to_url_query(&self) -> String {
        url::to_url_query(&self.to_request_params())
    }
}

impl Filterable for FacetQuery {
    fn filter_tree_mut(&mut self) -> &mut FilterTree {
        self.params.filters_mut()
    }

    fn filter_tree(&self) -> Option<&FilterTree> {
        self.params.filters()
    }
}

/// An entity resolution query: a partial record to match against a table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolveQuery {
    params: ParameterBag,
}

impl ResolveQuery {
    /// Creates an empty resolve query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a known attribute of the entity.
    pub fn add(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.params.set_json_map_entry(keys::VALUES, field, value);
        self
    }

    /// Flattens this query into the outbound parameter map.
    #[must_use]
    pub fn to_request_params(&self) -> BTreeMap<String, String> {
        self.params.to_request_params(None)
    }
}

/// A reverse geocode of a point.
#[derive(Debug, Clone, PartialEq)]
pub struct Geocode {
    params: ParameterBag,
}

impl Geocode {
    /// Creates a reverse geocode request for `point`.
    #[must_use]
    pub fn new(point: &Point) -> Self {
        let mut params = ParameterBag::new();
        params.set_json(keys::GEO, point.to_json());
        Self { params }
    }

    /// Flattens this request into the outbound parameter map.
    #[must_use]
    pub fn to_request_params(&self) -> BTreeMap<String, String> {
        self.params.to_request_params(None)
    }
}

/// A neighbourhood summary request at a point.
#[derive(Debug, Clone, PartialEq)]
pub struct Geopulse {
    params: ParameterBag,
}

impl Geopulse {
    /// Creates a geopulse request at `point`.
    #[must_use]
    pub fn new(point: &Point) -> Self {
        let mut params = ParameterBag::new();
        params.set_json(keys::GEO, point.to_json());
        Self { params }
    }

    /// Selects which pulse fields to return.
    pub fn only<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            self.params.add_to_comma_set(keys::SELECT, field);
        }
        self
    }

    /// Flattens this request into the outbound parameter map.
    #[must_use]
    pub fn to_request_params(&self) -> BTreeMap<String, String> {
        self.params.to_request_params(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::zero(0)]
    #[case::negative(-5)]
    fn non_positive_limit_is_omitted(#[case] limit: i64) {
        let mut query = Query::new();
        query.limit(limit);
        assert!(!query.to_request_params().contains_key("limit"));
    }

    #[test]
    fn positive_limit_is_emitted() {
        let mut query = Query::new();
        query.limit(10);
        assert_eq!(query.to_string(), "limit=10");
    }

    #[test]
    fn non_positive_offset_clears_earlier_value() {
        let mut query = Query::new();
        query.offset(20).offset(0);
        assert!(!query.to_request_params().contains_key("offset"));
    }

    #[test]
    fn sorts_keep_insertion_order() {
        let mut query = Query::new();
        query.sort_desc("$distance").sort_asc("name");
        assert_eq!(query.to_string(), "sort=$distance:desc,name:asc");
    }

    #[test]
    fn only_deduplicates_fields() {
        let mut query = Query::new();
        query.only(["name", "tel"]).only(["name"]);
        assert_eq!(
            query.select_fields(),
            Some(&["name".to_string(), "tel".to_string()][..])
        );
    }

    #[test]
    fn include_row_count_adds_flag() {
        let mut query = Query::new();
        query.include_row_count(true);
        assert_eq!(query.to_request_params()["include_count"], "true");
        query.include_row_count(false);
        assert!(query.to_request_params().is_empty());
    }

    #[test]
    fn within_sets_geo_circle() {
        let mut query = Query::new();
        query.within(&Circle::new(34.06, -118.41, 5000));
        assert_eq!(
            query.to_request_params()["geo"],
            r#"{"$circle":{"$center":[34.06,-118.41],"$meters":5000}}"#
        );
    }

    #[test]
    fn url_query_is_encoded() {
        let mut query = Query::new();
        query.search("coffee shop");
        assert_eq!(query.to_url_query(), "q=coffee%20shop");
    }

    #[test]
    fn facet_query_selects_fields_and_caps() {
        let mut facets = FacetQuery::new(["region", "locality"]);
        facets
            .min_count_per_facet_value(20)
            .max_values_per_facet(10)
            .include_row_count(true);
        facets.field("country").equal("US");

        let params = facets.to_request_params();
        assert_eq!(params["select"], "region,locality");
        assert_eq!(params["min_count"], "20");
        assert_eq!(params["limit"], "10");
        assert_eq!(params["include_count"], "true");
        assert_eq!(params["filters"], r#"{"country":{"$eq":"US"}}"#);
        assert_eq!(facets.fields(), ["region", "locality"]);
    }

    #[test]
    fn resolve_query_collects_values() {
        let mut resolve = ResolveQuery::new();
        resolve
            .add("name", "McDonalds")
            .add("latitude", 34.05671)
            .add("longitude", -118.42586);
        assert_eq!(
            resolve.to_request_params()["values"],
            r#"{"latitude":34.05671,"longitude":-118.42586,"name":"McDonalds"}"#
        );
    }

    #[test]
    fn geocode_and_geopulse_carry_point() {
        let point = Point::new(34.06021, -118.41828);
        assert_eq!(
            Geocode::new(&point).to_request_params()["geo"],
            r#"{"$point":[34.06021,-118.41828]}"#
        );

        let mut pulse = Geopulse::new(&point);
        pulse.only(["commercial_density", "income"]);
        let params = pulse.to_request_params();
        assert_eq!(params["select"], "commercial_density,income");
        assert!(params.contains_key("geo"));
    }

    #[test]
    fn clone_is_independent() {
        let mut query = Query::new();
        query.field("a").equal(1);
        let copy = query.clone();
        query.field("b").equal(2);
        assert_eq!(copy.to_string(), r#"filters={"a":{"$eq":1}}"#);
    }
}
