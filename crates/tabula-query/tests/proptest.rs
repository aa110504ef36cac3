//! Property-based tests for parameter rendering and filter composition.

use proptest::prelude::*;
use std::collections::HashSet;
use tabula_query::{Filterable, ParameterBag, Query};

proptest! {
    /// A comma set never renders a value twice, whatever the insertion order.
    #[test]
    fn comma_set_has_no_duplicates(values in prop::collection::vec("[a-d]{1,2}", 1..40)) {
        let mut bag = ParameterBag::new();
        for value in &values {
            bag.add_to_comma_set("select", value.clone());
        }

        let rendered = bag.to_request_params(None)["select"].clone();
        let parts: Vec<&str> = rendered.split(',').collect();
        let unique: HashSet<&str> = parts.iter().copied().collect();
        prop_assert_eq!(parts.len(), unique.len());

        let expected: HashSet<&str> = values.iter().map(String::as_str).collect();
        prop_assert_eq!(unique, expected);
    }

    /// A comma list renders exactly what was pushed, in order.
    #[test]
    fn comma_list_preserves_order(values in prop::collection::vec("[a-z]{1,5}:(asc|desc)", 1..20)) {
        let mut bag = ParameterBag::new();
        for value in &values {
            bag.push_to_comma_list("sort", value.clone());
        }
        prop_assert_eq!(bag.to_request_params(None)["sort"].clone(), values.join(","));
    }

    /// Without explicit grouping, n >= 2 predicates render as one `$and`
    /// holding them in insertion order.
    #[test]
    fn ungrouped_predicates_render_as_and(fields in prop::collection::vec("[a-z]{1,8}", 2..10)) {
        let mut query = Query::new();
        for field in &fields {
            query.field(field.as_str()).equal(1);
        }

        let filters: serde_json::Value =
            serde_json::from_str(&query.to_request_params()["filters"]).unwrap();
        let children = filters["$and"].as_array().unwrap();
        prop_assert_eq!(children.len(), fields.len());
        for (child, field) in children.iter().zip(&fields) {
            prop_assert_eq!(&child[field.as_str()]["$eq"], &serde_json::json!(1));
        }
    }

    /// Repeated pairwise regrouping never flattens: each round adds a level.
    #[test]
    fn nested_composition_keeps_depth(rounds in 1usize..8) {
        let mut query = Query::new();
        query.field("seed").equal(0);
        for round in 0..rounds {
            query.field("f").equal(round);
            if round % 2 == 0 {
                query.or_recent(2);
            } else {
                query.and_recent(2);
            }
        }

        let tree = query.filter_tree().unwrap();
        prop_assert_eq!(tree.len(), 1);
        prop_assert_eq!(tree.root().unwrap().depth(), rounds + 1);
    }
}
