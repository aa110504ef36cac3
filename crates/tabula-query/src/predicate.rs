//! Filter predicates and boolean groups.
//!
//! A filter is a tree of [`FilterNode`]s. Leaves are [`Predicate`]s, a single
//! `field operator operand` comparison, and inner nodes are
//! [`PredicateGroup`]s combining their children with `$and` or `$or`.
//!
//! Serialized forms:
//!
//! ```text
//! {"first_name": {"$eq": "Bradley"}}
//! {"$and": [{"region": {"$eq": "CA"}}, {"locality": {"$eq": "Los Angeles"}}]}
//! ```

use serde_json::{Map, Value};
use std::fmt;

/// Comparison operator of a [`Predicate`].
///
/// The set is fixed by the remote API. Operand shape is never checked against
/// the operator; a mismatch (`$in` with a scalar, say) is rejected remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `$eq`
    Equal,
    /// `$neq`
    NotEqual,
    /// `$in`, operand is a list.
    In,
    /// `$nin`, operand is a list.
    NotIn,
    /// `$bw`
    BeginsWith,
    /// `$nbw`
    NotBeginsWith,
    /// `$bwin`, operand is a list of prefixes.
    BeginsWithAny,
    /// `$nbwin`, operand is a list of prefixes.
    NotBeginsWithAny,
    /// `$blank`, operand is `true` (blank) or `false` (not blank).
    Blank,
    /// `$gt`
    GreaterThan,
    /// `$gte`
    GreaterThanOrEqual,
    /// `$lt`
    LessThan,
    /// `$lte`
    LessThanOrEqual,
    /// `$search`, full text search scoped to one field.
    Search,
}

impl Operator {
    /// Every operator, in wire-table order.
    pub const ALL: [Operator; 14] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::In,
        Operator::NotIn,
        Operator::BeginsWith,
        Operator::NotBeginsWith,
        Operator::BeginsWithAny,
        Operator::NotBeginsWithAny,
        Operator::Blank,
        Operator::GreaterThan,
        Operator::GreaterThanOrEqual,
        Operator::LessThan,
        Operator::LessThanOrEqual,
        Operator::Search,
    ];

    /// Returns the wire token for this operator, e.g. `"$eq"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "$eq",
            Self::NotEqual => "$neq",
            Self::In => "$in",
            Self::NotIn => "$nin",
            Self::BeginsWith => "$bw",
            Self::NotBeginsWith => "$nbw",
            Self::BeginsWithAny => "$bwin",
            Self::NotBeginsWithAny => "$nbwin",
            Self::Blank => "$blank",
            Self::GreaterThan => "$gt",
            Self::GreaterThanOrEqual => "$gte",
            Self::LessThan => "$lt",
            Self::LessThanOrEqual => "$lte",
            Self::Search => "$search",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean logic of a [`PredicateGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Logic {
    /// `$and`
    #[default]
    And,
    /// `$or`
    Or,
}

impl Logic {
    /// Returns the wire token for this logic, `"$and"` or `"$or"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "$and",
            Self::Or => "$or",
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field comparison. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    field: String,
    operator: Operator,
    operand: Value,
}

impl Predicate {
    /// Creates a predicate comparing `field` against `operand` with `operator`.
    pub fn new(operator: Operator, field: impl Into<String>, operand: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            operand: operand.into(),
        }
    }

    /// The field this predicate constrains.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The comparison operator.
    #[must_use]
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The operand, as given.
    #[must_use]
    pub fn operand(&self) -> &Value {
        &self.operand
    }

    /// Renders `{field: {operator: operand}}`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut comparison = Map::new();
        comparison.insert(self.operator.as_str().to_string(), self.operand.clone());

        let mut node = Map::new();
        node.insert(self.field.clone(), Value::Object(comparison));
        Value::Object(node)
    }
}

/// An `$and` / `$or` combination of filter nodes.
///
/// Children keep their insertion order when serialized. A group is never
/// simplified: one child still renders as a one-element array, and an empty
/// group renders as `{"$and": []}`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PredicateGroup {
    logic: Logic,
    children: Vec<FilterNode>,
}

impl PredicateGroup {
    /// Creates an empty group with the given logic.
    #[must_use]
    pub fn new(logic: Logic) -> Self {
        Self {
            logic,
            children: Vec::new(),
        }
    }

    /// Creates an `$and` group over `children`.
    pub fn with_children(children: impl IntoIterator<Item = FilterNode>) -> Self {
        Self {
            logic: Logic::And,
            children: children.into_iter().collect(),
        }
    }

    /// Sets this group's logic.
    pub fn set_logic(&mut self, logic: Logic) -> &mut Self {
        self.logic = logic;
        self
    }

    /// Consumes the group, returning it with `$or` logic.
    #[must_use]
    pub fn into_or(mut self) -> Self {
        self.logic = Logic::Or;
        self
    }

    /// Appends a child node.
    pub fn push(&mut self, node: impl Into<FilterNode>) {
        self.children.push(node.into());
    }

    /// This group's logic.
    #[must_use]
    pub fn logic(&self) -> Logic {
        self.logic
    }

    /// The children, in insertion order.
    #[must_use]
    pub fn children(&self) -> &[FilterNode] {
        &self.children
    }

    /// Number of direct children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if the group has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Renders `{logic: [child, ...]}`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let children = self.children.iter().map(FilterNode::to_json).collect();

        let mut node = Map::new();
        node.insert(self.logic.as_str().to_string(), Value::Array(children));
        Value::Object(node)
    }
}

/// A node of a filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// A leaf comparison.
    Predicate(Predicate),
    /// A boolean combination of nodes.
    Group(PredicateGroup),
}

impl FilterNode {
    /// Renders this node in the filter JSON grammar.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Predicate(predicate) => predicate.to_json(),
            Self::Group(group) => group.to_json(),
        }
    }

    /// Depth of the subtree rooted here; a predicate has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Predicate(_) => 1,
            Self::Group(group) => 1 + group.children.iter().map(Self::depth).max().unwrap_or(0),
        }
    }
}

impl From<Predicate> for FilterNode {
    fn from(predicate: Predicate) -> Self {
        Self::Predicate(predicate)
    }
}

impl From<PredicateGroup> for FilterNode {
    fn from(group: PredicateGroup) -> Self {
        Self::Group(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::equal(Operator::Equal, "$eq")]
    #[case::not_equal(Operator::NotEqual, "$neq")]
    #[case::is_in(Operator::In, "$in")]
    #[case::not_in(Operator::NotIn, "$nin")]
    #[case::begins_with(Operator::BeginsWith, "$bw")]
    #[case::not_begins_with(Operator::NotBeginsWith, "$nbw")]
    #[case::begins_with_any(Operator::BeginsWithAny, "$bwin")]
    #[case::not_begins_with_any(Operator::NotBeginsWithAny, "$nbwin")]
    #[case::blank(Operator::Blank, "$blank")]
    #[case::greater_than(Operator::GreaterThan, "$gt")]
    #[case::greater_or_equal(Operator::GreaterThanOrEqual, "$gte")]
    #[case::less_than(Operator::LessThan, "$lt")]
    #[case::less_or_equal(Operator::LessThanOrEqual, "$lte")]
    #[case::search(Operator::Search, "$search")]
    fn operator_wire_tokens(#[case] op: Operator, #[case] token: &str) {
        assert_eq!(op.as_str(), token);
        assert_eq!(op.to_string(), token);
    }

    #[test]
    fn operator_table_is_complete_and_unique() {
        let tokens: std::collections::HashSet<_> =
            Operator::ALL.iter().map(|op| op.as_str()).collect();
        assert_eq!(tokens.len(), Operator::ALL.len());
    }

    #[test]
    fn predicate_renders_nested_object() {
        let predicate = Predicate::new(Operator::Equal, "first_name", "Bradley");
        assert_eq!(
            predicate.to_json(),
            json!({"first_name": {"$eq": "Bradley"}})
        );
        assert_eq!(
            predicate.to_json().to_string(),
            r#"{"first_name":{"$eq":"Bradley"}}"#
        );
    }

    #[test]
    fn predicate_accepts_mismatched_operand() {
        let predicate = Predicate::new(Operator::In, "region", "CA");
        assert_eq!(predicate.to_json(), json!({"region": {"$in": "CA"}}));
    }

    #[test]
    fn group_keeps_child_order() {
        let group = PredicateGroup::with_children([
            Predicate::new(Operator::Equal, "b", 2).into(),
            Predicate::new(Operator::Equal, "a", 1).into(),
        ]);
        assert_eq!(
            group.to_json().to_string(),
            r#"{"$and":[{"b":{"$eq":2}},{"a":{"$eq":1}}]}"#
        );
    }

    #[test]
    fn single_child_group_is_not_simplified() {
        let mut group = PredicateGroup::new(Logic::Or);
        group.push(Predicate::new(Operator::Blank, "tel", true));
        assert_eq!(group.to_json(), json!({"$or": [{"tel": {"$blank": true}}]}));
    }

    #[test]
    fn empty_group_renders_empty_array() {
        assert_eq!(
            PredicateGroup::new(Logic::Or).to_json(),
            json!({"$or": []})
        );
        assert_eq!(PredicateGroup::default().to_json(), json!({"$and": []}));
    }

    #[test]
    fn set_logic_switches_key() {
        let mut group = PredicateGroup::default();
        group.push(Predicate::new(Operator::Equal, "a", 1));
        group.set_logic(Logic::Or);
        assert_eq!(group.logic(), Logic::Or);
        assert_eq!(group.to_json(), json!({"$or": [{"a": {"$eq": 1}}]}));
    }

    #[test]
    fn depth_counts_nesting() {
        let leaf = FilterNode::from(Predicate::new(Operator::Equal, "a", 1));
        let inner = PredicateGroup::with_children([leaf.clone()]).into_or();
        let outer = FilterNode::from(PredicateGroup::with_children([inner.into(), leaf.clone()]));
        assert_eq!(leaf.depth(), 1);
        assert_eq!(outer.depth(), 3);
    }
}
