//! Image handling in pure Rust, with no system dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Load** | `image::ImageReader` with content sniffing; missing file → placeholder |
//! | **Diff** | [`DiffEngine`] trait, [`RowDiffEngine`] (SHA-256 row fingerprints + `similar` Myers) |
//! | **Write** | `image::codecs::png::PngEncoder` |
//!
//! The module is split into:
//! - **Loader**: path → [`LoadedImage`]
//! - **Backend**: [`DiffEngine`] trait + [`DiffOutcome`]
//! - **Row diff**: the production engine
//! - **Parameters**: [`DiffStyle`] for rendering
//! - **Writer**: [`OutputDirectory`] + [`write_artifact`]

pub mod backend;
pub mod loader;
mod params;
pub mod row_diff;
pub mod writer;

pub use backend::{DiffArtifact, DiffEngine, DiffError, DiffOutcome};
pub use loader::{LoadError, LoadedImage, load_image};
pub use params::DiffStyle;
pub use row_diff::RowDiffEngine;
pub use writer::{OUTPUT_DIR_NAME, OutputDirectory, WriteError, write_artifact};
