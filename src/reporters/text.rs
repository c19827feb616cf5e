//! Text (terminal) reporter with colors and formatting

use crate::models::ConfidenceLevel;
use crate::scoring::AggregatedOutcome;
use anyhow::Result;

/// Confidence colors (ANSI escape codes)
fn confidence_color(confidence: ConfidenceLevel) -> &'static str {
    match confidence {
        ConfidenceLevel::Definitive => "\x1b[31m", // Red
        ConfidenceLevel::High => "\x1b[91m",       // Light red
        ConfidenceLevel::Medium => "\x1b[33m",     // Yellow
        ConfidenceLevel::Low => "\x1b[34m",        // Blue
        ConfidenceLevel::Uncertain => "\x1b[90m",  // Gray
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Render result as formatted terminal output
pub fn render(result: &AggregatedOutcome, ai_threshold: u8) -> Result<String> {
    let mut out = String::new();

    // Header
    let conf_c = confidence_color(result.final_confidence);
    out.push_str(&format!("\n{BOLD}AI Authorship Analysis{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Score: {BOLD}{}/100{RESET}  Confidence: {conf_c}{BOLD}{}{RESET}\n",
        result.final_score, result.final_confidence
    ));
    if let Some(tool) = &result.detected_tool {
        out.push_str(&format!("Tool: {BOLD}{}{RESET}\n", tool));
    }
    let verdict = if result.is_ai_generated(ai_threshold) {
        "likely AI-assisted"
    } else {
        "no AI assistance established"
    };
    out.push_str(&format!(
        "Verdict: {} {DIM}(threshold {}){RESET}\n\n",
        verdict, ai_threshold
    ));

    out.push_str(&format!("{}\n\n", result.reasoning));

    // Per-detector breakdown
    out.push_str(&format!(
        "{BOLD}DETECTORS{RESET} ({} run)\n",
        result.metadata.detectors_run
    ));
    for (name, row) in result.detector_breakdown() {
        let row_c = confidence_color(row.confidence);
        let tool = row
            .detected_tool
            .map(|t| format!("  {}", t))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {:<24} {:>3}%  {row_c}{:<10}{RESET}{}  {DIM}{:.1}ms{RESET}\n",
            name,
            row.score,
            row.confidence.to_string(),
            tool,
            row.duration_ms
        ));
    }
    out.push('\n');

    // Indicators grouped by type
    let groups = result.indicators_by_type();
    if groups.is_empty() {
        out.push_str(&format!("{DIM}No indicators found.{RESET}\n"));
    } else {
        out.push_str(&format!(
            "{BOLD}INDICATORS{RESET} ({} total)\n",
            result.aggregated_indicators.len()
        ));
        for (kind, indicators) in groups {
            out.push_str(&format!("  {}\n", kind.label()));
            for indicator in indicators {
                out.push_str(&format!(
                    "    - {} {DIM}[{:?}, +{}]{RESET}\n",
                    indicator.details, indicator.weight, indicator.score
                ));
            }
        }
    }

    if result.metadata.early_exit {
        out.push_str(&format!(
            "\n{DIM}Stopped early: remaining detectors were not needed.{RESET}\n"
        ));
    }

    Ok(out)
}
