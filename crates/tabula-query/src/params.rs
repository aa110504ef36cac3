//! Named, typed request parameters.
//!
//! Each parameter carries its own rendering strategy, applied only when the
//! bag is flattened into the outbound `string -> string` map:
//!
//! | variant     | rendered as                                         |
//! |-------------|-----------------------------------------------------|
//! | `Literal`   | the string itself                                   |
//! | `CommaSet`  | unique values joined with `,`                       |
//! | `CommaList` | values joined with `,`, order and repeats preserved |
//! | `Json`      | compact JSON text                                   |
//! | `Filters`   | the filter tree root as JSON, omitted when empty    |

use crate::filter_tree::FilterTree;
use crate::keys;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A parameter value and its rendering strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Rendered as-is.
    Literal(String),
    /// Set membership keyed on value equality, kept in first-insertion order
    /// so the rendering is deterministic.
    CommaSet(Vec<String>),
    /// Ordered list; order is significant.
    CommaList(Vec<String>),
    /// Arbitrary JSON, rendered whole.
    Json(Value),
    /// The filter tree slot.
    Filters(FilterTree),
}

impl ParamValue {
    /// Renders this value for the outbound map.
    ///
    /// Returns `None` when the value has nothing to send (an empty comma
    /// collection or an empty filter tree).
    #[must_use]
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Literal(value) => Some(value.clone()),
            Self::CommaSet(values) | Self::CommaList(values) => {
                (!values.is_empty()).then(|| values.join(","))
            }
            Self::Json(value) => Some(value.to_string()),
            Self::Filters(tree) => tree.to_json_string(),
        }
    }
}

/// Per-query store of named parameters awaiting serialization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterBag {
    params: BTreeMap<String, ParamValue>,
}

impl ParameterBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    /// Returns true if `key` is set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Removes `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.params.remove(key)
    }

    /// Number of parameters held, including ones that render to nothing.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if no parameter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Sets a literal parameter, replacing any previous value.
    pub fn set_literal(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params
            .insert(key.into(), ParamValue::Literal(value.into()));
    }

    /// Sets a JSON parameter, replacing any previous value.
    pub fn set_json(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.params.insert(key.into(), ParamValue::Json(value.into()));
    }

    /// Adds `value` to the comma set under `key`, creating the set on first
    /// use. Equal values are stored once.
    ///
    /// A non-set value already under `key` is replaced.
    pub fn add_to_comma_set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(ParamValue::CommaSet(values)) = self.params.get_mut(&key) {
            if !values.contains(&value) {
                values.push(value);
            }
            return;
        }
        self.params.insert(key, ParamValue::CommaSet(vec![value]));
    }

    /// Appends `value` to the ordered comma list under `key`, creating the
    /// list on first use.
    pub fn push_to_comma_list(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(ParamValue::CommaList(values)) = self.params.get_mut(&key) {
            values.push(value);
            return;
        }
        self.params.insert(key, ParamValue::CommaList(vec![value]));
    }

    /// Values of the comma set or list under `key`.
    #[must_use]
    pub fn comma_values(&self, key: &str) -> Option<&[String]> {
        match self.params.get(key) {
            Some(ParamValue::CommaSet(values) | ParamValue::CommaList(values)) => Some(values),
            _ => None,
        }
    }

    /// Sets `field` inside the JSON object parameter under `key`, creating
    /// the object on first use.
    pub fn set_json_map_entry(
        &mut self,
        key: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) {
        let key = key.into();
        if let Some(ParamValue::Json(Value::Object(map))) = self.params.get_mut(&key) {
            map.insert(field.into(), value.into());
            return;
        }
        let mut map = Map::new();
        map.insert(field.into(), value.into());
        self.params.insert(key, ParamValue::Json(Value::Object(map)));
    }

    /// The filter tree, if one was created.
    #[must_use]
    pub fn filters(&self) -> Option<&FilterTree> {
        match self.params.get(keys::FILTERS) {
            Some(ParamValue::Filters(tree)) => Some(tree),
            _ => None,
        }
    }

    /// The filter tree, created empty on first access.
    pub fn filters_mut(&mut self) -> &mut FilterTree {
        let slot = self
            .params
            .entry(keys::FILTERS.to_string())
            .or_insert_with(|| ParamValue::Filters(FilterTree::new()));
        filter_tree_in(slot)
    }

    /// Flattens the bag into the outbound parameter map.
    ///
    /// Entries of `extra` override entries of this bag on key collision.
    /// Entries that render to nothing are left out.
    #[must_use]
    pub fn to_request_params(&self, extra: Option<&ParameterBag>) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        for bag in std::iter::once(self).chain(extra) {
            for (key, value) in &bag.params {
                if let Some(rendered) = value.render() {
                    out.insert(key.clone(), rendered);
                }
            }
        }
        out
    }
}

/// The tree held by `slot`; any other value is replaced by an empty tree.
fn filter_tree_in(slot: &mut ParamValue) -> &mut FilterTree {
    match slot {
        ParamValue::Filters(tree) => tree,
        other => {
            *other = ParamValue::Filters(FilterTree::new());
            filter_tree_in(other)
        }
    }
}
