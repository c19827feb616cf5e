//! aidetect - AI authorship detection for pull requests
//!
//! Reads a pull request record, runs the configured detectors and reports
//! an AI likelihood score with its supporting evidence.

mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Initialize logging (stderr, so JSON on stdout stays clean)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    // Parse CLI args and run
    let cli = cli::Cli::parse();
    cli::run(cli)
}
