//! CLI argument structs for all commands.

use clap::Parser;
use std::path::PathBuf;
use tabula_query::Circle;

use super::types::{EqualityArg, ResponseKindArg, SortArg};
use super::validators::{parse_circle, parse_equality, parse_sort};

/// Arguments for the `query` command
#[derive(Parser, Debug, Clone)]
pub struct QueryArgs {
    /// Full text search term
    #[arg(short = 'q', long)]
    pub search: Option<String>,

    /// Maximum number of rows (0 or less sends no limit)
    #[arg(short, long, allow_negative_numbers = true)]
    pub limit: Option<i64>,

    /// Row offset for paging (0 or less sends no offset)
    #[arg(short, long, allow_negative_numbers = true)]
    pub offset: Option<i64>,

    /// Fields to return (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub select: Vec<String>,

    /// Sort order, repeatable (format: field:asc or field:desc)
    #[arg(long, value_parser = parse_sort)]
    pub sort: Vec<SortArg>,

    /// Equality filter, repeatable (format: field=value)
    ///
    /// Several filters are combined with AND.
    #[arg(long = "eq", value_parser = parse_equality)]
    pub equals: Vec<EqualityArg>,

    /// Restrict to a circle (format: lat,lon,meters)
    #[arg(long, value_parser = parse_circle, allow_hyphen_values = true)]
    pub within: Option<Circle>,

    /// Ask for the total matching row count
    #[arg(long)]
    pub include_count: bool,

    /// Print the percent-encoded query string instead of parameters
    #[arg(long)]
    pub url: bool,
}

/// Arguments for the `parse` command
#[derive(Parser, Debug, Clone)]
pub struct ParseArgs {
    /// Kind of response to parse
    #[arg(value_enum)]
    pub kind: ResponseKindArg,

    /// Response file (reads stdin when omitted or `-`)
    pub file: Option<PathBuf>,
}
