//! # diff-image-step
//!
//! A CI pipeline step for visual-regression checks. It compares a set of
//! "before" screenshots with a set of "after" screenshots and writes a diff
//! image for every after screenshot that visibly changed.
//!
//! # Pipeline
//!
//! ```text
//! 1. Validate  before/after roots  →  RootKind      (both files, or both directories)
//! 2. Resolve   RootKind + roots    →  [ImagePair]   (match after images to before images by name)
//! 3. Diff      each ImagePair      →  PairOutcome   (load → diff → keep/discard → write PNG)
//! 4. Publish   output directory    →  CI system     (bitrise envman add)
//! ```
//!
//! Stages 1, 2, and 4 are fatal on failure. Stage 3 isolates every pair: a
//! screenshot that fails to decode or write is recorded in the
//! [`pipeline::RunReport`] and the rest still get processed.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`validate`] | Stage 1: stats both roots and checks they are the same kind |
//! | [`resolve`] | Stage 2: pairs after images with before images (`.png`, non-recursive) |
//! | [`pipeline`] | Stage 3: per-pair orchestration, change decision, run report |
//! | [`publish`] | Stage 4: exports the output directory to the CI system |
//! | [`imaging`] | Loading, the row-level diff engine, PNG writing |
//! | [`config`] | CLI/env inputs plus optional TOML settings |
//! | [`types`] | Shared types (`RootKind`, `ImagePair`, `Bounds`) |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Missing Files Are Placeholders, Not Errors
//!
//! A screenshot that only exists on one side loads as a zero-area image. An
//! added screenshot therefore diffs as "every row inserted" and gets an
//! artifact like any other change, with no special-casing in the orchestrator.
//!
//! ## Bounds Rule By Default, Explicit Signal On Request
//!
//! By default a pair is kept when the diff artifact's bounds differ from the
//! before image's bounds. The diff engine also returns a tagged
//! [`imaging::DiffOutcome`] (`Unchanged` or `Changed`); setting
//! `change_detection = "explicit"` trusts that verdict instead, which also
//! catches screenshots that only lost rows.
//!
//! ## PNG-Only Output
//!
//! Any format the `image` crate decodes can be compared, but artifacts are
//! always written as PNG: lossless, so a diff never shows compression noise.

pub mod config;
pub mod imaging;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod publish;
pub mod resolve;
pub mod types;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
