//! docspec CLI: turn HTML API documentation into machine-readable artifacts.
//!
//! Enriches an OpenAPI document from documentation pages, writes per-endpoint
//! digests for LLM tooling, and crawls the raw documentation into one file.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
