//! Rendering parameters for the built-in diff renderer.
//!
//! These describe *how the artifact looks*, not whether a pair changed. They
//! are deserialized straight from the `[style]` table of the config file.
//!
//! ## Types
//!
//! - [`DiffStyle`]: tint colours for deleted/inserted rows, tint strength, and
//!   how far unchanged rows are faded toward white.

use serde::{Deserialize, Serialize};

/// Visual style of a rendered diff artifact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffStyle {
    /// Tint for rows present only in the before image.
    pub deleted: [u8; 3],
    /// Tint for rows present only in the after image.
    pub inserted: [u8; 3],
    /// How strongly the tint replaces the original pixel (0.0–1.0).
    pub strength: f32,
    /// How far unchanged rows are washed toward white (0.0–1.0).
    pub fade: f32,
}

impl Default for DiffStyle {
    fn default() -> Self {
        Self {
            deleted: [255, 0, 0],
            inserted: [0, 200, 0],
            strength: 0.4,
            fade: 0.6,
        }
    }
}

/// Linear blend of one channel toward `target` by `t` (0.0 keeps `value`).
#[inline]
pub(crate) fn blend_channel(value: u8, target: u8, t: f32) -> u8 {
    let v = value as f32 + (target as f32 - value as f32) * t;
    v.round().clamp(0.0, 255.0) as u8
}
