//! CLI command definitions and handlers

mod analyze;
mod detectors;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aidetect - AI authorship detection for pull requests
#[derive(Parser, Debug)]
#[command(name = "aidetect")]
#[command(
    version,
    about = "Estimate whether a pull request was written with an AI coding tool",
    long_about = "aidetect inspects pull request metadata (commit authors, commit timing, \
message style, description footers, labels and branch names) and reports an AI \
likelihood score, a confidence level and, when possible, the tool responsible.\n\n\
Input is a pull request record in JSON, as produced by a forge exporter.",
    after_help = "\
Examples:
  aidetect analyze pr.json                       Text report
  aidetect analyze pr.json --format json         JSON output for scripting
  aidetect analyze pr.json --only commit_pattern Run a single detector
  aidetect analyze pr.json --fail-on-ai          Exit code 1 if AI-assisted (CI mode)
  aidetect detectors                             List detectors and their state"
)]
pub struct Cli {
    /// Config file (default: aidetect.toml or .aidetectrc.json in the current directory)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a pull request record
    #[command(after_help = "\
Examples:
  aidetect analyze pr.json
  aidetect analyze pr.json --format json -o result.json
  aidetect analyze pr.json --optimized               Skip paid detectors when free ones are conclusive
  aidetect analyze pr.json --only explicit-attribution --only commit_pattern
  aidetect analyze pr.json --fail-on-ai              Exit code 1 when score >= ai_threshold")]
    Analyze {
        /// Path to the pull request record (JSON)
        pr: PathBuf,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Run free detectors first and skip paid ones when already conclusive
        #[arg(long, conflicts_with = "only")]
        optimized: bool,

        /// Run only these detectors, in this order (repeatable)
        #[arg(long)]
        only: Vec<String>,

        /// Exit with code 1 when the score reaches the configured ai_threshold
        #[arg(long)]
        fail_on_ai: bool,
    },

    /// List registered detectors and whether they are enabled
    Detectors,
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    let config = analyze::resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            pr,
            format,
            output,
            optimized,
            only,
            fail_on_ai,
        } => analyze::run(
            config,
            &pr,
            &format,
            output.as_deref(),
            optimized,
            &only,
            fail_on_ai,
        ),

        Commands::Detectors => detectors::run(config),
    }
}
