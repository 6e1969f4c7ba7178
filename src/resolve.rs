//! Pair resolution: which after images get compared against which before images.
//!
//! ## Collection mode
//!
//! Lists the entries directly under the after root (no recursion) and keeps
//! every non-directory entry whose extension is exactly `png`. The before side
//! is the same name joined onto the before root, whether or not it exists:
//!
//! ```text
//! before/                after/
//! ├── home.png    ←→     ├── home.png       pair
//! └── old.png            ├── login.png      pair (before missing → placeholder)
//!                        ├── notes.txt      skipped
//!                        └── HOME.PNG       skipped (extension is case-sensitive)
//! ```
//!
//! Pairs come out in directory-listing order, which is platform-dependent.
//!
//! ## Single mode
//!
//! Exactly one pair: the two roots themselves.

use crate::types::{ImagePair, RootKind};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// The only extension collection mode picks up. Compared case-sensitively.
pub const IMAGE_EXTENSION: &str = "png";

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Cannot list {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Extension is whatever follows the last `.`, so a file named just `.png`
/// counts (unlike `Path::extension`, which treats it as a dotfile).
fn has_image_extension(name: &OsStr) -> bool {
    let bytes = name.as_encoded_bytes();
    match bytes.iter().rposition(|&b| b == b'.') {
        Some(dot) => &bytes[dot + 1..] == IMAGE_EXTENSION.as_bytes(),
        None => false,
    }
}

/// Resolve the pairs to compare for an already-validated root kind.
pub fn resolve_pairs(
    kind: RootKind,
    before_root: &Path,
    after_root: &Path,
) -> Result<Vec<ImagePair>, ResolveError> {
    match kind {
        RootKind::SingleImage => Ok(vec![ImagePair::new(before_root, after_root)]),
        RootKind::Collection => resolve_collection(before_root, after_root),
    }
}

fn resolve_collection(before_root: &Path, after_root: &Path) -> Result<Vec<ImagePair>, ResolveError> {
    let mut pairs = Vec::new();

    for entry in WalkDir::new(after_root).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| ResolveError::List {
            path: after_root.to_path_buf(),
            source,
        })?;
        let name = entry.file_name();

        if entry.file_type().is_dir() || !has_image_extension(name) {
            tracing::trace!(entry = %entry.path().display(), "skipping non-image entry");
            continue;
        }

        pairs.push(ImagePair::new(before_root.join(name), after_root.join(name)));
    }

    tracing::debug!(count = pairs.len(), root = %after_root.display(), "resolved image pairs");
    Ok(pairs)
}
