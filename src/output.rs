//! CLI output formatting.
//!
//! # Output Format
//!
//! ```text
//! Configuration
//!     before_images: shots/before
//!     after_images: shots/after
//!     output: diff_image_output
//!     change_detection: bounds
//!
//! 001 home.png → home.png (changed)
//! 002 login.png (unchanged)
//! 003 signup.png → signup.png (added)
//! 004 broken.png FAILED at load before
//!         Failed to decode shots/before/broken.png: …
//!
//! Compared 4 pairs: 2 changed, 1 unchanged, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions do no I/O.

use crate::config::StepConfig;
use crate::pipeline::{PairOutcome, PairStatus, RunReport};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Configuration echo
// ============================================================================

/// Format the resolved inputs, printed once before any work starts.
pub fn format_config(config: &StepConfig, output_dir: &Path) -> Vec<String> {
    vec![
        "Configuration".to_string(),
        format!("    before_images: {}", config.before_images.display()),
        format!("    after_images: {}", config.after_images.display()),
        format!("    output: {}", output_dir.display()),
        format!(
            "    change_detection: {}",
            config.settings.change_detection
        ),
    ]
}

pub fn print_config(config: &StepConfig, output_dir: &Path) {
    for line in format_config(config, output_dir) {
        println!("{}", line);
    }
    println!();
}

// ============================================================================
// Per-pair progress
// ============================================================================

/// Format one pair's outcome.
///
/// Kept pairs show `→` and the artifact name; an added screenshot (no before
/// image) is labelled as such instead of "changed".
pub fn format_pair_outcome(index: usize, outcome: &PairOutcome) -> Vec<String> {
    let name = base_name(&outcome.pair.after);
    match &outcome.status {
        PairStatus::Kept { output } => {
            let label = if outcome.before_missing {
                "added"
            } else {
                "changed"
            };
            vec![format!(
                "{} {} \u{2192} {} ({})",
                format_index(index),
                name,
                base_name(output),
                label
            )]
        }
        PairStatus::Discarded => vec![format!("{} {} (unchanged)", format_index(index), name)],
        PairStatus::Failed { stage, reason } => vec![
            format!("{} {} FAILED at {}", format_index(index), name, stage),
            format!("        {}", reason),
        ],
    }
}

// ============================================================================
// Summary
// ============================================================================

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

pub fn format_summary(report: &RunReport) -> Vec<String> {
    let total = report.outcomes.len();
    let mut line = format!(
        "Compared {} pair{}: {} changed, {} unchanged",
        total,
        plural(total),
        report.kept(),
        report.discarded()
    );
    if report.has_failures() {
        line.push_str(&format!(", {} failed", report.failed()));
    }
    vec![line, format!("Diff images: {}", report.output_dir.display())]
}

pub fn print_summary(report: &RunReport) {
    println!();
    for line in format_summary(report) {
        println!("{}", line);
    }
}
