//! Fluent predicate construction and filter composition.
//!
//! Anything owning a filter tree implements [`Filterable`] and gets
//! `field(name)` plus the `and_*` / `or_*` composition methods:
//!
//! ```
//! use tabula_query::{Filterable, Query};
//!
//! let mut query = Query::new();
//! query.field("region").is_in(["MA", "VT", "NH"]);
//! query.field("first_name").equal("Chun");
//! query.field("last_name").equal("Kok");
//! query.or_recent(2);
//!
//! assert_eq!(
//!     query.to_request_params()["filters"],
//!     r#"{"$and":[{"region":{"$in":["MA","VT","NH"]}},{"$or":[{"last_name":{"$eq":"Kok"}},{"first_name":{"$eq":"Chun"}}]}]}"#
//! );
//! ```

use crate::filter_tree::FilterTree;
use crate::predicate::{FilterNode, Logic, Operator, Predicate};
use serde_json::Value;

/// A query-like value that owns a filter tree.
pub trait Filterable: Sized {
    /// The filter tree, created on first access.
    fn filter_tree_mut(&mut self) -> &mut FilterTree;

    /// The filter tree, if any filter was ever added.
    fn filter_tree(&self) -> Option<&FilterTree>;

    /// Adds a node to the filter tree.
    fn add_filter(&mut self, node: impl Into<FilterNode>) -> &mut Self {
        self.filter_tree_mut().add(node);
        self
    }

    /// Begins a predicate on `field`.
    fn field(&mut self, field: impl Into<String>) -> FieldBuilder<'_, Self> {
        FieldBuilder::new(self, field)
    }

    /// Pops the newest filter of each sibling and adds them here as one
    /// `$and` group.
    fn and_with(&mut self, siblings: &mut [&mut Self]) -> &mut Self {
        compose_siblings(self, Logic::And, siblings)
    }

    /// Pops the newest filter of each sibling and adds them here as one
    /// `$or` group.
    fn or_with(&mut self, siblings: &mut [&mut Self]) -> &mut Self {
        compose_siblings(self, Logic::Or, siblings)
    }

    /// Pops this query's newest filter, then each sibling's, and adds them
    /// here as one `$and` group.
    fn and_with_self(&mut self, siblings: &mut [&mut Self]) -> &mut Self {
        compose_siblings_with_self(self, Logic::And, siblings)
    }

    /// Pops this query's newest filter, then each sibling's, and adds them
    /// here as one `$or` group.
    fn or_with_self(&mut self, siblings: &mut [&mut Self]) -> &mut Self {
        compose_siblings_with_self(self, Logic::Or, siblings)
    }

    /// Regroups this query's `count` newest filters under `$and`.
    fn and_recent(&mut self, count: usize) -> &mut Self {
        self.filter_tree_mut().compose_recent(Logic::And, count);
        self
    }

    /// Regroups this query's `count` newest filters under `$or`.
    fn or_recent(&mut self, count: usize) -> &mut Self {
        self.filter_tree_mut().compose_recent(Logic::Or, count);
        self
    }
}

fn compose_siblings<'q, Q: Filterable>(
    target: &'q mut Q,
    logic: Logic,
    siblings: &mut [&mut Q],
) -> &'q mut Q {
    let mut trees: Vec<&mut FilterTree> = siblings
        .iter_mut()
        .map(|sibling| sibling.filter_tree_mut())
        .collect();
    target.filter_tree_mut().compose(logic, &mut trees);
    target
}

fn compose_siblings_with_self<'q, Q: Filterable>(
    target: &'q mut Q,
    logic: Logic,
    siblings: &mut [&mut Q],
) -> &'q mut Q {
    let mut trees: Vec<&mut FilterTree> = siblings
        .iter_mut()
        .map(|sibling| sibling.filter_tree_mut())
        .collect();
    target.filter_tree_mut().compose_with_self(logic, &mut trees);
    target
}

fn list<I, V>(values: I) -> Value
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Value::Array(values.into_iter().map(Into::into).collect())
}

/// Builds one predicate on a fixed field and attaches it to its owner.
///
/// Every terminal method consumes the builder and hands back the owner so
/// calls can be chained.
#[must_use = "a field builder adds nothing until an operator method is called"]
pub struct FieldBuilder<'q, Q: Filterable> {
    owner: &'q mut Q,
    field: String,
}

impl<'q, Q: Filterable> FieldBuilder<'q, Q> {
    /// Starts a predicate on `field` for `owner`.
    pub fn new(owner: &'q mut Q, field: impl Into<String>) -> Self {
        Self {
            owner,
            field: field.into(),
        }
    }

    fn attach(self, operator: Operator, operand: Value) -> &'q mut Q {
        let Self { owner, field } = self;
        owner.add_filter(Predicate::new(operator, field, operand))
    }

    /// Full text search on this field.
    pub fn search(self, term: impl Into<Value>) -> &'q mut Q {
        self.attach(Operator::Search, term.into())
    }

    /// Field equals `value`.
    pub fn equal(self, value: impl Into<Value>) -> &'q mut Q {
        self.attach(Operator::Equal, value.into())
    }

    /// Field does not equal `value`.
    pub fn not_equal(self, value: impl Into<Value>) -> &'q mut Q {
        self.attach(Operator::NotEqual, value.into())
    }

    /// Field equals one of `values`.
    pub fn is_in<I, V>(self, values: I) -> &'q mut Q
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.attach(Operator::In, list(values))
    }

    /// Field equals none of `values`.
    pub fn not_in<I, V>(self, values: I) -> &'q mut Q
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.attach(Operator::NotIn, list(values))
    }

    /// Field begins with `prefix`.
    pub fn begins_with(self, prefix: impl Into<String>) -> &'q mut Q {
        self.attach(Operator::BeginsWith, Value::String(prefix.into()))
    }

    /// Field does not begin with `prefix`.
    pub fn not_begins_with(self, prefix: impl Into<String>) -> &'q mut Q {
        self.attach(Operator::NotBeginsWith, Value::String(prefix.into()))
    }

    /// Field begins with any of `prefixes`.
    pub fn begins_with_any<I, V>(self, prefixes: I) -> &'q mut Q
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.attach(Operator::BeginsWithAny, list(prefixes))
    }

    /// Field begins with none of `prefixes`.
    pub fn not_begins_with_any<I, V>(self, prefixes: I) -> &'q mut Q
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.attach(Operator::NotBeginsWithAny, list(prefixes))
    }

    /// Field is blank.
    pub fn blank(self) -> &'q mut Q {
        self.attach(Operator::Blank, Value::Bool(true))
    }

    /// Field is not blank; rendered as `$blank: false`.
    pub fn not_blank(self) -> &'q mut Q {
        self.attach(Operator::Blank, Value::Bool(false))
    }

    /// Field is greater than `value`.
    pub fn greater_than(self, value: impl Into<Value>) -> &'q mut Q {
        self.attach(Operator::GreaterThan, value.into())
    }

    /// Field is greater than or equal to `value`.
    pub fn greater_than_or_equal(self, value: impl Into<Value>) -> &'q mut Q {
        self.attach(Operator::GreaterThanOrEqual, value.into())
    }

    /// Field is less than `value`.
    pub fn less_than(self, value: impl Into<Value>) -> &'q mut Q {
        self.attach(Operator::LessThan, value.into())
    }

    /// Field is less than or equal to `value`.
    pub fn less_than_or_equal(self, value: impl Into<Value>) -> &'q mut Q {
        self.attach(Operator::LessThanOrEqual, value.into())
    }
}

#[cfg(test)]
mod tests {
    use crate::Query;
    use crate::builder::Filterable;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn filters(query: &Query) -> Value {
        let text = query.to_request_params()["filters"].clone();
        serde_json::from_str(&text).unwrap()
    }

    #[rstest]
    #[case::search(|q: &mut Query| { q.field("name").search("Starbucks"); }, json!({"name": {"$search": "Starbucks"}}))]
    #[case::equal(|q: &mut Query| { q.field("name").equal("Starbucks"); }, json!({"name": {"$eq": "Starbucks"}}))]
    #[case::not_equal(|q: &mut Query| { q.field("name").not_equal("Starbucks"); }, json!({"name": {"$neq": "Starbucks"}}))]
    #[case::is_in(|q: &mut Query| { q.field("region").is_in(["CA", "NY"]); }, json!({"region": {"$in": ["CA", "NY"]}}))]
    #[case::not_in(|q: &mut Query| { q.field("region").not_in(["CA"]); }, json!({"region": {"$nin": ["CA"]}}))]
    #[case::begins_with(|q: &mut Query| { q.field("name").begins_with("Star"); }, json!({"name": {"$bw": "Star"}}))]
    #[case::not_begins_with(|q: &mut Query| { q.field("name").not_begins_with("Star"); }, json!({"name": {"$nbw": "Star"}}))]
    #[case::begins_with_any(|q: &mut Query| { q.field("name").begins_with_any(["a", "b"]); }, json!({"name": {"$bwin": ["a", "b"]}}))]
    #[case::not_begins_with_any(|q: &mut Query| { q.field("name").not_begins_with_any(["a"]); }, json!({"name": {"$nbwin": ["a"]}}))]
    #[case::blank(|q: &mut Query| { q.field("tel").blank(); }, json!({"tel": {"$blank": true}}))]
    #[case::not_blank(|q: &mut Query| { q.field("tel").not_blank(); }, json!({"tel": {"$blank": false}}))]
    #[case::greater_than(|q: &mut Query| { q.field("rating").greater_than(7.5); }, json!({"rating": {"$gt": 7.5}}))]
    #[case::greater_than_or_equal(|q: &mut Query| { q.field("rating").greater_than_or_equal(7); }, json!({"rating": {"$gte": 7}}))]
    #[case::less_than(|q: &mut Query| { q.field("rating").less_than(3); }, json!({"rating": {"$lt": 3}}))]
    #[case::less_than_or_equal(|q: &mut Query| { q.field("rating").less_than_or_equal(3); }, json!({"rating": {"$lte": 3}}))]
    fn builder_methods_render_operator(#[case] build: fn(&mut Query), #[case] expected: Value) {
        let mut query = Query::new();
        build(&mut query);
        assert_eq!(filters(&query), expected);
    }

    #[test]
    fn chained_fields_accumulate() {
        let mut query = Query::new();
        query
            .field("first_name")
            .equal("Bradley")
            .field("region")
            .equal("CA")
            .field("locality")
            .equal("Los Angeles");
        assert_eq!(
            query.to_request_params()["filters"],
            r#"{"$and":[{"first_name":{"$eq":"Bradley"}},{"region":{"$eq":"CA"}},{"locality":{"$eq":"Los Angeles"}}]}"#
        );
    }

    #[test]
    fn and_with_siblings_empties_them() {
        let mut a = Query::new();
        a.field("name").begins_with("Star");
        let mut b = Query::new();
        b.field("region").equal("CA");

        let mut target = Query::new();
        target.and_with(&mut [&mut a, &mut b]);

        assert_eq!(
            filters(&target),
            json!({"$and": [{"name": {"$bw": "Star"}}, {"region": {"$eq": "CA"}}]})
        );
        assert!(!a.to_request_params().contains_key("filters"));
        assert!(!b.to_request_params().contains_key("filters"));
    }

    #[test]
    fn or_with_empty_sibling_contributes_nothing() {
        let mut a = Query::new();
        a.field("name").equal("x");
        let mut empty = Query::new();

        let mut target = Query::new();
        target.or_with(&mut [&mut a, &mut empty]);

        assert_eq!(filters(&target), json!({"$or": [{"name": {"$eq": "x"}}]}));
    }
}
