//! `aidetect detectors` command

use aidetect::config::{DetectorConfig, KNOWN_DETECTORS};
use aidetect::detectors::DetectorEngine;
use anyhow::Result;

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

pub(super) fn run(config: DetectorConfig) -> Result<()> {
    let engine = DetectorEngine::with_default_detectors(config)?;
    let config = engine.config();

    println!("{BOLD}Registered detectors{RESET}");
    for name in engine.detector_names() {
        let Some(detector) = engine.detector(name) else {
            continue;
        };
        let state = if config.is_enabled(name) { "on " } else { "off" };
        let cost = if detector.requires_external_api() {
            "paid"
        } else {
            "free"
        };
        println!(
            "  [{}] {:<22} {} weight {:.2}  {DIM}{}{RESET}",
            state,
            name,
            cost,
            detector.confidence_weight(),
            detector.description()
        );
    }

    let unregistered: Vec<&str> = KNOWN_DETECTORS
        .iter()
        .map(|(name, _)| *name)
        .filter(|name| !engine.has_detector(name))
        .collect();
    if !unregistered.is_empty() {
        println!(
            "\n{DIM}Not available in this build: {}{RESET}",
            unregistered.join(", ")
        );
    }

    println!(
        "\nScoring: {} (early exit {}, consensus boost {}, uncertainty threshold {:.0})",
        config.strategy(),
        if config.should_early_exit() { "on" } else { "off" },
        if config.should_apply_consensus_boost() { "on" } else { "off" },
        config.uncertainty_threshold()
    );
    println!("AI threshold: {}", config.ai_threshold());

    Ok(())
}
