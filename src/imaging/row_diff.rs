//! Row-level diff renderer, the built-in [`DiffEngine`].
//!
//! Screenshots mostly change by whole horizontal bands: a line of text
//! rewraps, a banner appears, a list grows. So images are compared as
//! sequences of pixel rows rather than pixel by pixel:
//!
//! 1. Every row is fingerprinted (SHA-256 of its RGBA bytes, padded with
//!    transparent pixels to the wider of the two images).
//! 2. The two fingerprint sequences are aligned with a Myers diff
//!    (`similar::capture_diff_slices`).
//! 3. The artifact gets one output row per aligned entry:
//!
//! | Entry | Source row | Rendering |
//! |---|---|---|
//! | equal | before | faded toward white |
//! | delete | before | tinted with `style.deleted` |
//! | insert | after | tinted with `style.inserted` |
//!
//! The artifact is `max(before.width, after.width)` wide. When nothing was
//! inserted or deleted it has exactly the before image's bounds, and the
//! outcome is [`DiffOutcome::Unchanged`].

use super::backend::{DiffArtifact, DiffEngine, DiffError, DiffOutcome};
use super::loader::LoadedImage;
use super::params::{DiffStyle, blend_channel};
use image::{DynamicImage, Rgba, RgbaImage};
use sha2::{Digest, Sha256};
use similar::{Algorithm, DiffTag, capture_diff_slices};

type RowKey = [u8; 32];

/// Largest artifact buffer the engine will allocate, in bytes. Same as the
/// `image` crate's default decoder allocation limit.
pub const MAX_ARTIFACT_BYTES: u64 = 512 * 1024 * 1024;

/// Fail the pair, rather than the process, when `width x rows` RGBA pixels
/// would exceed [`MAX_ARTIFACT_BYTES`].
fn check_artifact_size(width: u32, rows: u64) -> Result<(), DiffError> {
    let bytes = u64::from(width).saturating_mul(rows).saturating_mul(4);
    if bytes > MAX_ARTIFACT_BYTES {
        return Err(DiffError::Failed(format!(
            "diff image of {width}x{rows} pixels exceeds the {MAX_ARTIFACT_BYTES} byte limit"
        )));
    }
    Ok(())
}

/// Diff engine aligning images row by row.
#[derive(Debug, Clone, Default)]
pub struct RowDiffEngine {
    style: DiffStyle,
}

impl RowDiffEngine {
    pub fn new(style: DiffStyle) -> Self {
        Self { style }
    }
}

fn row_bytes(img: &RgbaImage, y: u32) -> &[u8] {
    let stride = img.width() as usize * 4;
    let start = y as usize * stride;
    &img.as_raw()[start..start + stride]
}

fn fingerprints(img: &RgbaImage, common_width: u32) -> Vec<RowKey> {
    let padding = vec![0u8; (common_width - img.width()) as usize * 4];
    (0..img.height())
        .map(|y| {
            let mut hasher = Sha256::new();
            hasher.update(row_bytes(img, y));
            hasher.update(&padding);
            hasher.finalize().into()
        })
        .collect()
}

/// Which way a source row is drawn into the artifact.
#[derive(Debug, Clone, Copy)]
enum RowKind {
    Equal,
    Deleted,
    Inserted,
}

impl RowDiffEngine {
    fn paint(&self, kind: RowKind, px: &Rgba<u8>) -> Rgba<u8> {
        let [r, g, b, a] = px.0;
        match kind {
            RowKind::Equal => {
                let t = self.style.fade;
                Rgba([
                    blend_channel(r, 255, t),
                    blend_channel(g, 255, t),
                    blend_channel(b, 255, t),
                    a,
                ])
            }
            RowKind::Deleted | RowKind::Inserted => {
                let tint = match kind {
                    RowKind::Deleted => self.style.deleted,
                    _ => self.style.inserted,
                };
                let t = self.style.strength;
                Rgba([
                    blend_channel(r, tint[0], t),
                    blend_channel(g, tint[1], t),
                    blend_channel(b, tint[2], t),
                    255,
                ])
            }
        }
    }

    fn render(
        &self,
        before: &RgbaImage,
        after: &RgbaImage,
    ) -> Result<(RgbaImage, bool), DiffError> {
        let width = before.width().max(after.width());
        // Every row of the taller image appears at least once.
        check_artifact_size(width, u64::from(before.height().max(after.height())))?;

        let old = fingerprints(before, width);
        let new = fingerprints(after, width);
        let ops = capture_diff_slices(Algorithm::Myers, &old, &new);

        // (source image, source row, how to draw it)
        let mut rows: Vec<(&RgbaImage, u32, RowKind)> =
            Vec::with_capacity(old.len().max(new.len()));
        let mut changed = false;
        for op in &ops {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            match tag {
                DiffTag::Equal => {
                    rows.extend(old_range.map(|y| (before, y as u32, RowKind::Equal)));
                }
                DiffTag::Delete => {
                    changed = true;
                    rows.extend(old_range.map(|y| (before, y as u32, RowKind::Deleted)));
                }
                DiffTag::Insert => {
                    changed = true;
                    rows.extend(new_range.map(|y| (after, y as u32, RowKind::Inserted)));
                }
                DiffTag::Replace => {
                    changed = true;
                    rows.extend(old_range.map(|y| (before, y as u32, RowKind::Deleted)));
                    rows.extend(new_range.map(|y| (after, y as u32, RowKind::Inserted)));
                }
            }
        }

        check_artifact_size(width, rows.len() as u64)?;
        let mut out = RgbaImage::new(width, rows.len() as u32);
        for (out_y, (src, src_y, kind)) in rows.into_iter().enumerate() {
            for x in 0..src.width() {
                let px = self.paint(kind, src.get_pixel(x, src_y));
                out.put_pixel(x, out_y as u32, px);
            }
        }
        Ok((out, changed))
    }
}

impl DiffEngine for RowDiffEngine {
    fn diff(&self, before: &LoadedImage, after: &LoadedImage) -> Result<DiffOutcome, DiffError> {
        let before = before.image().to_rgba8();
        let after = after.image().to_rgba8();

        if u64::from(before.height()) + u64::from(after.height()) > u64::from(u32::MAX) {
            return Err(DiffError::Failed(format!(
                "combined height {} + {} exceeds the artifact limit",
                before.height(),
                after.height()
            )));
        }

        let (image, changed) = self.render(&before, &after)?;
        let artifact = DiffArtifact::new(DynamicImage::ImageRgba8(image));
        Ok(if changed {
            DiffOutcome::Changed(artifact)
        } else {
            DiffOutcome::Unchanged(artifact)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::rgba_from_fn;
    use crate::types::Bounds;

    fn banded(width: u32, height: u32) -> RgbaImage {
        rgba_from_fn(width, height, |_, y| {
            let v = 40 + (y * 7) as u8;
            [v, v, v, 255]
        })
    }

    fn loaded(img: RgbaImage) -> LoadedImage {
        LoadedImage::from_image(DynamicImage::ImageRgba8(img))
    }

    #[test]
    fn identical_images_are_unchanged_with_before_bounds() {
        let engine = RowDiffEngine::default();
        let before = loaded(banded(16, 10));
        let after = loaded(banded(16, 10));

        let outcome = engine.diff(&before, &after).unwrap();
        assert!(!outcome.is_changed());
        assert_eq!(outcome.artifact().bounds(), before.bounds());
    }

    #[test]
    fn changed_row_is_reported_as_delete_plus_insert() {
        let engine = RowDiffEngine::default();
        let before = loaded(banded(8, 6));
        let mut edited = banded(8, 6);
        for x in 0..8 {
            edited.put_pixel(x, 2, Rgba([0, 0, 0, 255]));
        }
        let after = loaded(edited);

        let outcome = engine.diff(&before, &after).unwrap();
        assert!(outcome.is_changed());
        assert_eq!(outcome.artifact().bounds(), Bounds::at_origin(8, 7));
    }

    #[test]
    fn added_image_is_all_inserted_rows() {
        let engine = RowDiffEngine::default();
        let before = LoadedImage::placeholder();
        let after = loaded(banded(5, 4));

        let outcome = engine.diff(&before, &after).unwrap();
        assert!(outcome.is_changed());
        assert_eq!(outcome.artifact().bounds(), Bounds::at_origin(5, 4));

        let style = DiffStyle::default();
        let px = outcome.artifact().image.to_rgba8().get_pixel(0, 0).0;
        let source = 40u8;
        assert_eq!(px[0], blend_channel(source, style.inserted[0], style.strength));
        assert_eq!(px[1], blend_channel(source, style.inserted[1], style.strength));
        assert_eq!(px[3], 255);
    }

    #[test]
    fn removed_rows_are_tinted_as_deleted() {
        let engine = RowDiffEngine::default();
        let before = loaded(banded(3, 5));
        let after = loaded(banded(3, 4));

        let outcome = engine.diff(&before, &after).unwrap();
        assert!(outcome.is_changed());
        // Deletions alone keep the before height: exactly the case the
        // bounds-equality rule cannot see.
        assert_eq!(outcome.artifact().bounds(), before.bounds());

        let last = outcome.artifact().image.to_rgba8().get_pixel(0, 4).0;
        let style = DiffStyle::default();
        assert_eq!(last[0], blend_channel(40 + 28, style.deleted[0], style.strength));
    }

    #[test]
    fn wider_after_widens_artifact() {
        let engine = RowDiffEngine::default();
        let before = loaded(banded(4, 3));
        let after = loaded(banded(6, 3));

        let outcome = engine.diff(&before, &after).unwrap();
        assert!(outcome.is_changed());
        assert_eq!(outcome.artifact().bounds().width, 6);
    }

    #[test]
    fn unchanged_rows_are_faded() {
        let style = DiffStyle {
            fade: 1.0,
            ..DiffStyle::default()
        };
        let engine = RowDiffEngine::new(style);
        let img = banded(2, 2);

        let outcome = engine.diff(&loaded(img.clone()), &loaded(img)).unwrap();
        let px = outcome.artifact().image.to_rgba8().get_pixel(1, 1).0;
        assert_eq!(px, [255, 255, 255, 255]);
    }

    #[test]
    fn artifact_size_limit() {
        assert!(check_artifact_size(1920, 2 * 1080).is_ok());
        assert!(check_artifact_size(100_000_000, 100_000_000).is_err());
        assert!(check_artifact_size(u32::MAX, u64::MAX).is_err());
    }

    #[test]
    fn opposite_aspect_ratios_fail_the_pair_instead_of_allocating() {
        let engine = RowDiffEngine::default();
        let wide = loaded(rgba_from_fn(100_000, 1, |_, _| [1, 2, 3, 255]));
        let tall = loaded(rgba_from_fn(1, 100_000, |_, _| [1, 2, 3, 255]));

        let err = engine.diff(&wide, &tall).unwrap_err();
        assert!(err.to_string().contains("byte limit"));
    }

    #[test]
    fn padding_does_not_equate_different_widths_with_content() {
        let narrow = rgba_from_fn(2, 1, |_, _| [9, 9, 9, 255]);
        let wide = rgba_from_fn(3, 1, |_, _| [9, 9, 9, 255]);
        assert_ne!(fingerprints(&narrow, 3), fingerprints(&wide, 3));
    }
}
