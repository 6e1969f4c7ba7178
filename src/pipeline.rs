//! Run orchestration: validate → resolve → diff each pair → publish.
//!
//! ## Run states
//!
//! ```text
//! Idle → Validated → Resolving → ProcessingPairs(0..n) → Done
//! ```
//!
//! Validation, listing, and publishing failures are fatal and surface as
//! [`StepError`]. Everything that can go wrong with a single pair is caught
//! and recorded as [`PairStatus::Failed`], and the next pair proceeds:
//!
//! ```text
//! pair: load before → load after → diff → (Kept | Discarded)
//!                 ╲            ╲       ╲        ╲
//!                  ╰────────────┴───────┴────────┴──→ Failed { stage, reason }
//! ```
//!
//! Pairs are processed one at a time, in resolver order.

use crate::config::{ChangeDetection, ConfigError, StepConfig};
use crate::imaging::{DiffEngine, OutputDirectory, load_image, write_artifact};
use crate::publish::{PublishError, ResultPublisher};
use crate::resolve::{ResolveError, resolve_pairs};
use crate::types::{ImagePair, RootKind};
use crate::validate::{ValidationError, validate_roots};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Run-level failures. Each one aborts the run with exit code 1.
#[derive(Error, Debug)]
pub enum StepError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Which step of a pair failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    LoadBefore,
    LoadAfter,
    Diff,
    Write,
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureStage::LoadBefore => "load before",
            FailureStage::LoadAfter => "load after",
            FailureStage::Diff => "diff",
            FailureStage::Write => "write",
        };
        f.write_str(s)
    }
}

/// Final state of one pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PairStatus {
    /// Changed; the artifact was written to `output`.
    Kept { output: PathBuf },
    /// Unchanged; nothing written.
    Discarded,
    Failed { stage: FailureStage, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairOutcome {
    pub pair: ImagePair,
    /// True when the before image did not exist (an added screenshot).
    pub before_missing: bool,
    #[serde(flatten)]
    pub status: PairStatus,
}

/// Everything a run produced, for printing and the optional JSON report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub mode: RootKind,
    pub output_dir: PathBuf,
    pub outcomes: Vec<PairOutcome>,
}

impl RunReport {
    pub fn kept(&self) -> usize {
        self.count(|s| matches!(s, PairStatus::Kept { .. }))
    }

    pub fn discarded(&self) -> usize {
        self.count(|s| matches!(s, PairStatus::Discarded))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, PairStatus::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&PairStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

fn failed(stage: FailureStage, err: impl std::fmt::Display) -> PairStatus {
    PairStatus::Failed {
        stage,
        reason: err.to_string(),
    }
}

/// Load, diff, decide, and (maybe) write a single pair.
///
/// Never returns an error: failures become [`PairStatus::Failed`].
pub fn diff_pair(
    engine: &impl DiffEngine,
    pair: &ImagePair,
    output: &OutputDirectory,
    detection: ChangeDetection,
) -> PairOutcome {
    let before_missing = !pair.before.exists();
    let status = diff_pair_status(engine, pair, output, detection);

    if let PairStatus::Failed { stage, reason } = &status {
        tracing::warn!(after = %pair.after.display(), %stage, reason = %reason, "pair failed");
    }

    PairOutcome {
        pair: pair.clone(),
        before_missing,
        status,
    }
}

fn diff_pair_status(
    engine: &impl DiffEngine,
    pair: &ImagePair,
    output: &OutputDirectory,
    detection: ChangeDetection,
) -> PairStatus {
    let before = match load_image(&pair.before) {
        Ok(img) => img,
        Err(e) => return failed(FailureStage::LoadBefore, e),
    };
    let after = match load_image(&pair.after) {
        Ok(img) => img,
        Err(e) => return failed(FailureStage::LoadAfter, e),
    };
    let outcome = match engine.diff(&before, &after) {
        Ok(outcome) => outcome,
        Err(e) => return failed(FailureStage::Diff, e),
    };

    let changed = match detection {
        ChangeDetection::Explicit => outcome.is_changed(),
        ChangeDetection::Bounds => before.bounds() != outcome.artifact().bounds(),
    };
    tracing::debug!(
        after = %pair.after.display(),
        before_bounds = %before.bounds(),
        diff_bounds = %outcome.artifact().bounds(),
        %detection,
        changed,
        "diffed pair"
    );
    if !changed {
        return PairStatus::Discarded;
    }

    match write_artifact(outcome.artifact(), &pair.after, output) {
        Ok(path) => PairStatus::Kept { output: path },
        Err(e) => failed(FailureStage::Write, e),
    }
}

/// Process `pairs` in order, reporting each outcome as it completes.
pub fn process_pairs(
    engine: &impl DiffEngine,
    pairs: &[ImagePair],
    output: &OutputDirectory,
    detection: ChangeDetection,
    mut on_outcome: impl FnMut(&PairOutcome),
) -> Vec<PairOutcome> {
    pairs
        .iter()
        .map(|pair| {
            let outcome = diff_pair(engine, pair, output, detection);
            on_outcome(&outcome);
            outcome
        })
        .collect()
}

/// Validate the roots and resolve the pairs for a run.
pub fn plan(before: &Path, after: &Path) -> Result<(RootKind, Vec<ImagePair>), StepError> {
    let kind = validate_roots(before, after)?;
    let pairs = resolve_pairs(kind, before, after)?;
    Ok((kind, pairs))
}

/// Run the whole step: prepare output, plan, process, publish.
///
/// The output directory is prepared first, before validation, so it exists
/// for the CI system even when no pair differs.
pub fn run(
    config: &StepConfig,
    engine: &impl DiffEngine,
    publisher: &dyn ResultPublisher,
    on_outcome: impl FnMut(&PairOutcome),
) -> Result<RunReport, StepError> {
    config.validate()?;
    let output = OutputDirectory::prepare(&config.source_dir);

    let (mode, pairs) = plan(&config.before_images, &config.after_images)?;
    tracing::info!(%mode, pairs = pairs.len(), "processing image pairs");

    let outcomes = process_pairs(
        engine,
        &pairs,
        &output,
        config.settings.change_detection,
        on_outcome,
    );

    let output_dir = output.absolute_path();
    publisher.publish(
        &config.settings.export_key,
        &output_dir.to_string_lossy(),
    )?;

    Ok(RunReport {
        mode,
        output_dir,
        outcomes,
    })
}
