//! Binary crate for the `nws` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments into filter criteria
//! - Interactive configuration of the user agent
//! - Plain-text output of alerts and endpoint data

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
