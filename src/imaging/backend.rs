//! Diff collaborator trait and shared types.
//!
//! The [`DiffEngine`] trait is the one seam between orchestration and pixel
//! work: given a before and an after image, produce a [`DiffArtifact`] and say
//! explicitly whether anything changed.
//!
//! The production implementation is
//! [`RowDiffEngine`](super::row_diff::RowDiffEngine). Tests swap in a
//! recording mock so orchestration can be checked without touching pixels.

use super::loader::LoadedImage;
use crate::types::Bounds;
use image::{DynamicImage, GenericImageView};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("Diff failed: {0}")]
    Failed(String),
}

/// A raster produced by comparing a before/after pair.
#[derive(Debug, Clone)]
pub struct DiffArtifact {
    pub image: DynamicImage,
}

impl DiffArtifact {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn bounds(&self) -> Bounds {
        let (width, height) = self.image.dimensions();
        Bounds::at_origin(width, height)
    }
}

/// The collaborator's verdict on a pair, carrying the artifact either way.
#[derive(Debug, Clone)]
pub enum DiffOutcome {
    Unchanged(DiffArtifact),
    Changed(DiffArtifact),
}

impl DiffOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, DiffOutcome::Changed(_))
    }

    pub fn artifact(&self) -> &DiffArtifact {
        match self {
            DiffOutcome::Unchanged(a) | DiffOutcome::Changed(a) => a,
        }
    }
}

/// Trait for diff collaborators.
pub trait DiffEngine {
    /// Compare `before` against `after`.
    ///
    /// Either side may be a zero-area placeholder.
    fn diff(&self, before: &LoadedImage, after: &LoadedImage) -> Result<DiffOutcome, DiffError>;
}
