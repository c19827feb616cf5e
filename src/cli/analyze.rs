//! `aidetect analyze` command

use aidetect::config::{discover_config, load_config, DetectorConfig};
use aidetect::detectors::DetectorEngine;
use aidetect::models::PullRequestRecord;
use aidetect::reporters;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// Explicit `--config` path, else discovery in the current directory
pub(super) fn resolve_config(path: Option<&Path>) -> Result<DetectorConfig> {
    match path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            Ok(discover_config(&cwd))
        }
    }
}

fn load_pull_request(path: &Path) -> Result<PullRequestRecord> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pull request record {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse pull request record {}", path.display()))
}

pub(super) fn run(
    config: DetectorConfig,
    pr_path: &Path,
    format: &str,
    output: Option<&Path>,
    optimized: bool,
    only: &[String],
    fail_on_ai: bool,
) -> Result<()> {
    let pr = load_pull_request(pr_path)?;
    debug!(
        "Loaded '{}' with {} commit(s) from {}",
        pr.title,
        pr.commit_count(),
        pr_path.display()
    );

    let ai_threshold = config.ai_threshold();
    let engine = DetectorEngine::with_default_detectors(config)?;

    let result = if !only.is_empty() {
        let names: Vec<&str> = only.iter().map(String::as_str).collect();
        engine.detect_with(&names, &pr)
    } else if optimized {
        engine.detect_optimized(&pr)
    } else {
        engine.detect(&pr)
    };

    let rendered = reporters::report(&result, ai_threshold, format)?;
    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    if fail_on_ai && result.is_ai_generated(ai_threshold) {
        eprintln!(
            "Failing due to --fail-on-ai (score {} >= threshold {})",
            result.final_score, ai_threshold
        );
        std::process::exit(1);
    }

    Ok(())
}
