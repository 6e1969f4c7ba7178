//! Root-kind validation.
//!
//! Before any pair is touched, both roots are stat'ed and must agree: two
//! files, or two directories. Anything else aborts the run; there is no
//! partial-success path here.

use crate::types::RootKind;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Cannot stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "Incompatible root kinds: before_images ({before}) is a {before_kind}, after_images ({after}) is a {after_kind}"
    )]
    IncompatibleKinds {
        before: PathBuf,
        before_kind: &'static str,
        after: PathBuf,
        after_kind: &'static str,
    },
}

fn kind_of(path: &Path) -> Result<RootKind, ValidationError> {
    let meta = fs::metadata(path).map_err(|source| ValidationError::Stat {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(if meta.is_dir() {
        RootKind::Collection
    } else {
        RootKind::SingleImage
    })
}

fn describe(kind: RootKind) -> &'static str {
    match kind {
        RootKind::SingleImage => "file",
        RootKind::Collection => "directory",
    }
}

/// Check that `before` and `after` are the same kind of location.
pub fn validate_roots(before: &Path, after: &Path) -> Result<RootKind, ValidationError> {
    let before_kind = kind_of(before)?;
    let after_kind = kind_of(after)?;

    if before_kind != after_kind {
        return Err(ValidationError::IncompatibleKinds {
            before: before.to_path_buf(),
            before_kind: describe(before_kind),
            after: after.to_path_buf(),
            after_kind: describe(after_kind),
        });
    }

    tracing::debug!(kind = %after_kind, "validated image roots");
    Ok(after_kind)
}
