//! CLI value types and their conversions to query types.

use clap::ValueEnum;
use serde_json::Value;
use tabula_query::ResponseKind;

/// One `--sort` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortArg {
    /// Field to sort on.
    pub field: String,
    /// Sort descending instead of ascending.
    pub descending: bool,
}

/// One `--eq` flag.
#[derive(Debug, Clone, PartialEq)]
pub struct EqualityArg {
    /// Field to compare.
    pub field: String,
    /// Value the field must equal.
    pub value: Value,
}

/// Response kind for the `parse` command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKindArg {
    /// Rows from a read, resolve, geocode or geopulse request
    Read,
    /// Facet value counts
    Facet,
    /// Table schema
    Schema,
    /// Submit result
    Submit,
    /// Flag acknowledgement
    Flag,
    /// Envelope only
    Raw,
}

impl From<ResponseKindArg> for ResponseKind {
    fn from(kind: ResponseKindArg) -> Self {
        match kind {
            ResponseKindArg::Read => Self::Read,
            ResponseKindArg::Facet => Self::Facet,
            ResponseKindArg::Schema => Self::Schema,
            ResponseKindArg::Submit => Self::Submit,
            ResponseKindArg::Flag => Self::Flag,
            ResponseKindArg::Raw => Self::Raw,
        }
    }
}

impl std::fmt::Display for ResponseKindArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(ResponseKind::from(*self).as_str())
    }
}
