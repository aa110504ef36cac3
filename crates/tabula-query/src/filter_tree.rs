//! The `filters` parameter slot and the pop-and-regroup algorithm.
//!
//! A [`FilterTree`] holds an ordered list of top-level nodes combined with an
//! implicit `$and`. It renders to exactly one root:
//!
//! - no nodes: nothing (the `filters` parameter is omitted)
//! - one node: that node, unwrapped
//! - two or more: `{"$and": [node, ...]}` in insertion order
//!
//! Composition peels the most recent top-level node off each source tree and
//! attaches the peeled nodes, grouped under the requested logic, to the
//! target tree. Given a tree holding `region`, `first_name`, `last_name`:
//!
//! ```
//! use tabula_query::filter_tree::FilterTree;
//! use tabula_query::predicate::{Logic, Operator, Predicate};
//!
//! let mut tree = FilterTree::new();
//! tree.add(Predicate::new(Operator::In, "region", vec!["MA", "VT"]));
//! tree.add(Predicate::new(Operator::Equal, "first_name", "Chun"));
//! tree.add(Predicate::new(Operator::Equal, "last_name", "Kok"));
//! tree.compose_recent(Logic::Or, 2);
//!
//! assert_eq!(
//!     tree.to_json_string().unwrap(),
//!     r#"{"$and":[{"region":{"$in":["MA","VT"]}},{"$or":[{"last_name":{"$eq":"Kok"}},{"first_name":{"$eq":"Chun"}}]}]}"#
//! );
//! ```

use crate::predicate::{FilterNode, Logic, PredicateGroup};
use serde_json::Value;
use tracing::trace;

/// Top-level filter nodes of one query, with implicit `$and` semantics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterTree {
    roots: Vec<FilterNode>,
}

impl FilterTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a top-level node.
    pub fn add(&mut self, node: impl Into<FilterNode>) {
        self.roots.push(node.into());
    }

    /// Removes and returns the most recently added top-level node.
    ///
    /// Returns `None` on an empty tree; popping nothing is not an error.
    pub fn pop_last(&mut self) -> Option<FilterNode> {
        self.roots.pop()
    }

    /// Top-level nodes in insertion order.
    #[must_use]
    pub fn roots(&self) -> &[FilterNode] {
        &self.roots
    }

    /// Number of top-level nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns true if no node has been added (or all were popped).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Pops the last node of each source into a new group with `logic`.
    ///
    /// Sources are visited in order; an empty source contributes nothing. The
    /// group is returned even when nothing was popped.
    pub fn regroup(logic: Logic, sources: &mut [&mut FilterTree]) -> PredicateGroup {
        let mut group = PredicateGroup::new(logic);
        for source in sources.iter_mut() {
            if let Some(node) = source.pop_last() {
                group.push(node);
            }
        }
        group
    }

    /// Pops the last node of each source and adds them to this tree as one
    /// group with `logic`.
    pub fn compose(&mut self, logic: Logic, sources: &mut [&mut FilterTree]) {
        let group = Self::regroup(logic, sources);
        trace!(
            logic = %logic,
            sources = sources.len(),
            popped = group.len(),
            "regrouped sibling filters"
        );
        self.add(group);
    }

    /// Pops the last node of this tree, then of each source, and adds them
    /// back to this tree as one group with `logic`.
    pub fn compose_with_self(&mut self, logic: Logic, sources: &mut [&mut FilterTree]) {
        let mut group = PredicateGroup::new(logic);
        let trees = std::iter::once(&mut *self)
            .chain(sources.iter_mut().map(|source| &mut **source));
        for tree in trees {
            if let Some(node) = tree.pop_last() {
                group.push(node);
            }
        }
        trace!(
            logic = %logic,
            sources = sources.len() + 1,
            popped = group.len(),
            "regrouped own and sibling filters"
        );
        self.add(group);
    }

    /// Pops up to `count` nodes from this tree and re-adds them as one group.
    ///
    /// This is composition where every source is the tree itself, so the
    /// popped nodes appear most recent first.
    pub fn compose_recent(&mut self, logic: Logic, count: usize) {
        let mut group = PredicateGroup::new(logic);
        for _ in 0..count {
            if let Some(node) = self.pop_last() {
                group.push(node);
            }
        }
        trace!(logic = %logic, requested = count, popped = group.len(), "regrouped recent filters");
        self.add(group);
    }

    /// The single root this tree renders as, if any.
    #[must_use]
    pub fn root(&self) -> Option<FilterNode> {
        match self.roots.as_slice() {
            [] => None,
            [only] => Some(only.clone()),
            many => Some(PredicateGroup::with_children(many.iter().cloned()).into()),
        }
    }

    /// Renders the root in the filter JSON grammar.
    #[must_use]
    pub fn to_json(&self) -> Option<Value> {
        self.root().map(|root| root.to_json())
    }

    /// Renders the root as compact JSON text.
    #[must_use]
    pub fn to_json_string(&self) -> Option<String> {
        self.to_json().map(|value| value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{Operator, Predicate};
    use serde_json::json;

    fn eq(field: &str, value: &str) -> Predicate {
        Predicate::new(Operator::Equal, field, value)
    }

    #[test]
    fn empty_tree_renders_nothing() {
        let tree = FilterTree::new();
        assert!(tree.is_empty());
        assert!(tree.to_json().is_none());
    }

    #[test]
    fn single_node_renders_unwrapped() {
        let mut tree = FilterTree::new();
        tree.add(eq("first_name", "Bradley"));
        assert_eq!(
            tree.to_json_string().unwrap(),
            r#"{"first_name":{"$eq":"Bradley"}}"#
        );
    }

    #[test]
    fn several_nodes_render_as_implicit_and() {
        let mut tree = FilterTree::new();
        tree.add(eq("first_name", "Bradley"));
        tree.add(eq("region", "CA"));
        tree.add(eq("locality", "Los Angeles"));
        assert_eq!(
            tree.to_json_string().unwrap(),
            r#"{"$and":[{"first_name":{"$eq":"Bradley"}},{"region":{"$eq":"CA"}},{"locality":{"$eq":"Los Angeles"}}]}"#
        );
    }

    #[test]
    fn single_or_group_root_is_not_merged_with_later_nodes() {
        let mut tree = FilterTree::new();
        tree.add(eq("a", "1"));
        tree.add(eq("b", "2"));
        tree.compose_recent(Logic::Or, 2);
        tree.add(eq("c", "3"));
        assert_eq!(
            tree.to_json().unwrap(),
            json!({"$and": [
                {"$or": [{"b": {"$eq": "2"}}, {"a": {"$eq": "1"}}]},
                {"c": {"$eq": "3"}}
            ]})
        );
    }

    #[test]
    fn pop_last_on_empty_is_none() {
        let mut tree = FilterTree::new();
        assert!(tree.pop_last().is_none());
    }

    #[test]
    fn compose_pops_one_node_per_source() {
        let mut a = FilterTree::new();
        a.add(eq("x", "1"));
        a.add(eq("y", "2"));
        let mut b = FilterTree::new();
        b.add(eq("z", "3"));

        let mut target = FilterTree::new();
        target.compose(Logic::And, &mut [&mut a, &mut b]);

        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
        assert_eq!(
            target.to_json().unwrap(),
            json!({"$and": [{"y": {"$eq": "2"}}, {"z": {"$eq": "3"}}]})
        );
    }

    #[test]
    fn compose_with_empty_sources_adds_empty_group() {
        let mut a = FilterTree::new();
        let mut target = FilterTree::new();
        target.compose(Logic::Or, &mut [&mut a]);
        assert_eq!(target.len(), 1);
        assert_eq!(target.to_json_string().unwrap(), r#"{"$or":[]}"#);
    }

    #[test]
    fn compose_recent_beyond_len_takes_what_exists() {
        let mut tree = FilterTree::new();
        tree.add(eq("a", "1"));
        tree.compose_recent(Logic::And, 3);
        assert_eq!(tree.to_json(), Some(json!({"$and": [{"a": {"$eq": "1"}}]})));
    }

    #[test]
    fn regroup_leaves_target_untouched() {
        let mut a = FilterTree::new();
        a.add(eq("a", "1"));
        let group = FilterTree::regroup(Logic::Or, &mut [&mut a]);
        assert_eq!(group.logic(), Logic::Or);
        assert_eq!(group.len(), 1);
        assert!(a.is_empty());
    }
}
