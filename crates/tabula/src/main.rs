//! Tabula CLI binary.

use anyhow::Result;
use tabula::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the tabula CLI.
///
/// Uses tokio's `current_thread` runtime; every command is a short sequence
/// of file or stdin reads.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=tabula=debug,tabula_query=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tabula=info,tabula_query=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting tabula CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Tabula CLI completed successfully");
    Ok(())
}
