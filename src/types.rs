//! Shared types used across the validate → resolve → diff stages.
//!
//! These are derived once per run and never persisted, except as part of the
//! optional JSON run report.

use serde::Serialize;
use std::path::PathBuf;

/// What kind of location the before/after roots point at.
///
/// Produced once by [`crate::validate::validate_roots`] and passed down, so
/// nothing downstream inspects file modes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RootKind {
    /// Both roots are single image files.
    SingleImage,
    /// Both roots are directories of same-named images.
    Collection,
}

impl std::fmt::Display for RootKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RootKind::SingleImage => f.write_str("single image"),
            RootKind::Collection => f.write_str("collection"),
        }
    }
}

/// A before/after pair to compare.
///
/// `after` always names an entry discovered during resolution. `before` may
/// not exist on disk; that is how added screenshots show up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagePair {
    pub before: PathBuf,
    pub after: PathBuf,
}

impl ImagePair {
    pub fn new(before: impl Into<PathBuf>, after: impl Into<PathBuf>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
        }
    }

    /// Base file name of the after image, used to name the diff artifact.
    pub fn after_name(&self) -> Option<&std::ffi::OsStr> {
        self.after.file_name()
    }
}

/// Rectangular bounds of a raster: origin plus size.
///
/// Decoded images always sit at the origin; the struct keeps the origin so
/// bounds comparisons read the same as the rectangle they describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn at_origin(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}
