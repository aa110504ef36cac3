//! Write-side requests: row submissions, flags and their metadata.

use crate::keys;
use crate::params::ParameterBag;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// An add or update submission of row values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Submit {
    params: ParameterBag,
}

impl Submit {
    /// Creates an empty submission.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a submission from `(field, value)` pairs.
    pub fn from_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut submit = Self::new();
        for (field, value) in values {
            submit.set_value(field, value);
        }
        submit
    }

    /// Sets one field of the submitted row.
    pub fn set_value(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.params.set_json_map_entry(keys::VALUES, field, value);
        self
    }

    /// Clears one field of the row by submitting `null`.
    pub fn remove_value(&mut self, field: impl Into<String>) -> &mut Self {
        self.set_value(field, Value::Null)
    }

    /// Flattens this submission into the outbound parameter map.
    #[must_use]
    pub fn to_request_params(&self) -> BTreeMap<String, String> {
        self.params.to_request_params(None)
    }
}

/// Attribution attached to submit and flag requests.
///
/// Metadata is a persistent value: every setter returns a new `Metadata`
/// and leaves the receiver untouched, so one base value can be tagged
/// differently per call.
///
/// ```
/// use tabula_query::Metadata;
///
/// let base = Metadata::new().user("alice");
/// let tagged = base.comment("closed in 2019");
/// assert!(!base.to_request_params().contains_key("comment"));
/// assert_eq!(tagged.to_request_params()["user"], "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metadata {
    params: ParameterBag,
}

impl Metadata {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with(&self, key: &str, value: String) -> Self {
        let mut params = self.params.clone();
        params.set_literal(key, value);
        Self { params }
    }

    /// Names the submitting user.
    #[must_use]
    pub fn user(&self, username: impl Into<String>) -> Self {
        self.with(keys::USER, username.into())
    }

    /// Explains the change.
    #[must_use]
    pub fn comment(&self, comment: impl Into<String>) -> Self {
        self.with(keys::COMMENT, comment.into())
    }

    /// Cites the source of the data.
    #[must_use]
    pub fn reference(&self, reference: impl Into<String>) -> Self {
        self.with(keys::REFERENCE, reference.into())
    }

    /// Marks the request as a dry run; nothing is written remotely.
    #[must_use]
    pub fn debug(&self, debug: bool) -> Self {
        self.with(keys::DEBUG, debug.to_string())
    }

    /// Flattens the metadata into the outbound parameter map.
    #[must_use]
    pub fn to_request_params(&self) -> BTreeMap<String, String> {
        self.params.to_request_params(None)
    }
}

/// Problem reported by a flag request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagProblem {
    /// The row duplicates another row.
    Duplicate,
    /// The row holds wrong data.
    Inaccurate,
    /// The row is offensive or otherwise inappropriate.
    Inappropriate,
    /// The entity does not exist.
    Nonexistent,
    /// The row is spam.
    Spam,
    /// Anything else; explain in the metadata comment.
    Other,
}

impl FlagProblem {
    /// Returns the wire value, e.g. `"duplicate"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Duplicate => "duplicate",
            Self::Inaccurate => "inaccurate",
            Self::Inappropriate => "inappropriate",
            Self::Nonexistent => "nonexistent",
            Self::Spam => "spam",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FlagProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_collects_values_and_nulls() {
        let mut submit = Submit::from_values([("name", "Cafe"), ("locality", "Austin")]);
        submit.remove_value("tel");
        assert_eq!(
            submit.to_request_params()["values"],
            r#"{"locality":"Austin","name":"Cafe","tel":null}"#
        );
    }

    #[test]
    fn metadata_setters_do_not_mutate_receiver() {
        let base = Metadata::new().user("bob");
        let debug = base.debug(true).reference("http://example.com");

        assert_eq!(base.to_request_params().len(), 1);
        let params = debug.to_request_params();
        assert_eq!(params["user"], "bob");
        assert_eq!(params["debug"], "true");
        assert_eq!(params["reference"], "http://example.com");
    }

    #[test]
    fn flag_problem_wire_values() {
        assert_eq!(FlagProblem::Nonexistent.to_string(), "nonexistent");
        assert_eq!(FlagProblem::Other.as_str(), "other");
    }
}
