//! Diagnostic logging.
//!
//! User-facing progress goes through [`crate::output`] to stdout. Everything
//! else (per-pair decisions, swallowed failures, the export call) is emitted
//! with `tracing` and rendered by the subscriber installed here, on stderr.
//!
//! The filter comes from `RUST_LOG`, defaulting to `diff_image_step=info`.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line, for log collectors
    Json,
}

const DEFAULT_FILTER: &str = "diff_image_step=info";

static INIT_ONCE: Once = Once::new();

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(format: LogFormat) {
    INIT_ONCE.call_once(|| {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr);
        let result = match format {
            LogFormat::Pretty => builder.with_target(false).try_init(),
            LogFormat::Json => builder.json().try_init(),
        };
        if let Err(e) = result {
            eprintln!("logging already initialised: {e}");
        }
    });
}
