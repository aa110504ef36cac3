//! Tabula - client side of a remote tabular data API.
//!
//! This crate pairs the query builders and response parsers of
//! [`tabula_query`] with a request layer: a [`Client`] that maps each
//! operation to its API path, a [`Transport`] seam that performs the actual
//! request, a queue for batching reads into one round trip, and YAML client
//! configuration. The `tabula` binary exposes query building and response
//! parsing on the command line.

#![forbid(unsafe_code)]

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

// Public CLI module (needed by binary)
pub mod cli;

pub use batch::{Batch, PendingRequest, RequestQueue};
pub use client::Client;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use transport::{Method, Transport};
