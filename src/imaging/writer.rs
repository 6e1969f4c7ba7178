//! Persisting kept diff artifacts.
//!
//! Artifacts are always PNG, written into the run's [`OutputDirectory`] under
//! the after image's base name. The destination is created if absent and
//! truncated if present, so a re-run with the same inputs overwrites rather
//! than accumulates.

use super::backend::DiffArtifact;
use image::codecs::png::PngEncoder;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the directory created under the base directory.
pub const OUTPUT_DIR_NAME: &str = "diff_image_output";

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("After image has no file name: {0}")]
    NoFileName(PathBuf),
    #[error("Cannot open {path} for writing: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("PNG encode failed for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// The single per-run location kept artifacts are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDirectory {
    path: PathBuf,
}

impl OutputDirectory {
    /// `<base>/diff_image_output`, created if missing.
    ///
    /// Creation is best-effort: a failure is logged and the run carries on,
    /// and the writes into it fail per pair instead.
    pub fn prepare(base: &Path) -> Self {
        let path = base.join(OUTPUT_DIR_NAME);
        if let Err(e) = std::fs::create_dir_all(&path) {
            tracing::warn!(path = %path.display(), error = %e, "could not create output directory");
        }
        Self { path }
    }

    /// Use an existing location as-is, without creating anything.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute form of the directory, as exported to the CI system.
    pub fn absolute_path(&self) -> PathBuf {
        std::path::absolute(&self.path).unwrap_or_else(|_| self.path.clone())
    }

    /// Where the artifact for `after` would be written.
    pub fn target_for(&self, after: &Path) -> Result<PathBuf, WriteError> {
        after
            .file_name()
            .map(|name| self.path.join(name))
            .ok_or_else(|| WriteError::NoFileName(after.to_path_buf()))
    }
}

/// Write `artifact` as a PNG named after `after`'s base name.
pub fn write_artifact(
    artifact: &DiffArtifact,
    after: &Path,
    output: &OutputDirectory,
) -> Result<PathBuf, WriteError> {
    let target = output.target_for(after)?;
    let io_err = |source| WriteError::Io {
        path: target.clone(),
        source,
    };

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&target)
        .map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    artifact
        .image
        .write_with_encoder(PngEncoder::new(&mut writer))
        .map_err(|source| WriteError::Encode {
            path: target.clone(),
            source,
        })?;
    writer.flush().map_err(io_err)?;

    Ok(target)
}
