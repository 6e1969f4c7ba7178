//! Image loading with missing-file substitution.
//!
//! A path that does not exist is not an error: it loads as a zero-area
//! placeholder at the origin. That is how a screenshot that was added (no
//! before image) or removed (no after image) flows through the diff.
//!
//! Decoding is delegated to the `image` crate. The format is sniffed from the
//! file contents, not the extension, so a JPEG saved as `.png` still loads.

use crate::types::Bounds;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// A decoded raster, or the zero-area placeholder for a missing file.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    image: DynamicImage,
    placeholder: bool,
}

impl LoadedImage {
    /// The zero-area stand-in for a path that does not exist.
    pub fn placeholder() -> Self {
        Self {
            image: DynamicImage::new_rgba8(0, 0),
            placeholder: true,
        }
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image,
            placeholder: false,
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn bounds(&self) -> Bounds {
        let (width, height) = self.image.dimensions();
        Bounds::at_origin(width, height)
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Load an image, substituting a placeholder when the path does not exist.
pub fn load_image(path: &Path) -> Result<LoadedImage, LoadError> {
    match std::fs::metadata(path) {
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "image missing, using placeholder");
            return Ok(LoadedImage::placeholder());
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
        Ok(_) => {}
    }

    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let image = ImageReader::open(path)
        .map_err(io_err)?
        .with_guessed_format()
        .map_err(io_err)?
        .decode()
        .map_err(|source| LoadError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(LoadedImage::from_image(image))
}
