//! Shared test utilities: synthetic screenshots on disk.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let (before, after) = setup_roots(tmp.path());
//! write_solid_png(&before.join("home.png"), 8, 8, [255, 255, 255, 255]);
//! write_banded_png(&after.join("home.png"), 8, 8, 3);
//! ```

use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

// =========================================================================
// Fixture setup
// =========================================================================

/// Create empty `before/` and `after/` directories under `root`.
pub fn setup_roots(root: &Path) -> (PathBuf, PathBuf) {
    let before = root.join("before");
    let after = root.join("after");
    std::fs::create_dir_all(&before).unwrap();
    std::fs::create_dir_all(&after).unwrap();
    (before, after)
}

// =========================================================================
// Synthetic images
// =========================================================================

/// Build an RGBA image from a per-pixel function.
pub fn rgba_from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| Rgba(f(x, y)))
}

/// Write a PNG built from a per-pixel function, creating parent directories.
pub fn write_png(path: &Path, width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    rgba_from_fn(width, height, f).save(path).unwrap();
}

/// Write a single-colour PNG.
pub fn write_solid_png(path: &Path, width: u32, height: u32, color: [u8; 4]) {
    write_png(path, width, height, |_, _| color);
}

/// Write a PNG where every row has a distinct grey level, with row
/// `marked_row` painted black. Distinct rows keep the row alignment
/// unambiguous.
pub fn write_banded_png(path: &Path, width: u32, height: u32, marked_row: u32) {
    write_png(path, width, height, |_, y| {
        if y == marked_row {
            [0, 0, 0, 255]
        } else {
            let v = 40 + (y * 7 % 200) as u8;
            [v, v, v, 255]
        }
    });
}

/// Sorted file names in a directory.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
