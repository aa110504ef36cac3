//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `query`: Build a read query from flags and print its parameters
//! - `parse`: Parse a saved response and print a summary
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! tabula query --search coffee --eq region=CA --sort '$distance:desc' --url
//! tabula parse read response.json --json
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{ParseArgs, QueryArgs};
pub use execute::{build_query, summarize};
pub use types::{EqualityArg, ResponseKindArg, SortArg};
pub use validators::{parse_circle, parse_equality, parse_sort};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human readable lines.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Tabula - query builder and response inspector for a tabular data API
///
/// Builds request parameters offline and summarizes saved responses. No
/// request is sent over the network.
#[derive(Parser, Debug)]
#[command(name = "tabula")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build a read query and print its request parameters
    ///
    /// Flags map one-to-one onto query methods. Use `--url` for the
    /// percent-encoded query string a transport would send.
    Query(QueryArgs),

    /// Parse a response payload and print a summary
    ///
    /// Reads the payload from a file, or from stdin when no file is given.
    Parse(ParseArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns an error if input cannot be read or a response is malformed.
    pub async fn execute(&self) -> Result<()> {
        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Query(args)) => execute::execute_query(args, output_mode),
            Some(Commands::Parse(args)) => execute::execute_parse(args, output_mode).await,
            None => {
                println!("No command given. Run 'tabula --help' for usage.");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parse_no_command() {
        let cli = Cli::try_parse_from(["tabula"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn parse_global_json_flag() {
        let cli = Cli::try_parse_from(["tabula", "query", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Some(Commands::Query(_))));
    }

    #[test]
    fn parse_command_takes_kind_and_file() {
        let cli = Cli::try_parse_from(["tabula", "parse", "facet", "out.json"]).unwrap();
        match cli.command {
            Some(Commands::Parse(args)) => {
                assert_eq!(args.kind, ResponseKindArg::Facet);
                assert_eq!(args.file, Some(PathBuf::from("out.json")));
            }
            _ => panic!("Expected Parse command"),
        }
    }

    #[test]
    fn parse_command_file_is_optional() {
        let cli = Cli::try_parse_from(["tabula", "parse", "raw"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Parse(ParseArgs { file: None, .. }))));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(Cli::try_parse_from(["tabula", "parse", "csv"]).is_err());
    }

    #[test]
    fn bad_sort_is_rejected_at_parse_time() {
        assert!(Cli::try_parse_from(["tabula", "query", "--sort", "name:up"]).is_err());
    }

    #[test]
    fn sort_flags_keep_order() {
        let cli =
            Cli::try_parse_from(["tabula", "query", "--sort", "b:desc", "--sort", "a"]).unwrap();
        match cli.command {
            Some(Commands::Query(args)) => {
                let fields: Vec<_> = args.sort.iter().map(|s| s.field.as_str()).collect();
                assert_eq!(fields, ["b", "a"]);
            }
            _ => panic!("Expected Query command"),
        }
    }
}
