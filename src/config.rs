//! Step configuration.
//!
//! Inputs come from two places:
//!
//! - **CLI flags / environment** (parsed in `main.rs` with clap): the
//!   before/after roots and the base directory the output directory lives in.
//!   On Bitrise these arrive as the `before_images`, `after_images`, and
//!   `BITRISE_SOURCE_DIR` environment variables.
//! - **An optional TOML file** (`--config`) for everything that has a
//!   sensible default.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! change_detection = "bounds"     # "bounds" or "explicit"
//! export_key = "GENERATED_DIFF_IMAGES_DIR"
//!
//! [style]
//! deleted = [255, 0, 0]
//! inserted = [0, 200, 0]
//! strength = 0.4
//! fade = 0.6
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::DiffStyle;
use crate::publish::DEFAULT_EXPORT_KEY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// How the orchestrator decides a pair is worth writing out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDetection {
    /// Trust the diff engine's `Changed`/`Unchanged` verdict.
    Explicit,
    /// Keep the artifact when its bounds differ from the before image's.
    #[default]
    Bounds,
}

impl std::fmt::Display for ChangeDetection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeDetection::Explicit => f.write_str("explicit"),
            ChangeDetection::Bounds => f.write_str("bounds"),
        }
    }
}

/// Settings loaded from the TOML file. All fields have defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StepSettings {
    pub change_detection: ChangeDetection,
    /// Key the output directory is exported under.
    pub export_key: String,
    /// Rendering style for the built-in diff engine.
    pub style: DiffStyle,
}

impl Default for StepSettings {
    fn default() -> Self {
        Self {
            change_detection: ChangeDetection::default(),
            export_key: DEFAULT_EXPORT_KEY.to_string(),
            style: DiffStyle::default(),
        }
    }
}

impl StepSettings {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("style.strength", self.style.strength), ("style.fade", self.style.fade)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!("{name} must be 0.0-1.0")));
            }
        }
        if self.export_key.is_empty() {
            return Err(ConfigError::Validation("export_key must not be empty".into()));
        }
        if !self
            .export_key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::Validation(format!(
                "export_key may only contain letters, digits and '_': {}",
                self.export_key
            )));
        }
        Ok(())
    }
}

/// Everything a run needs, resolved once at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct StepConfig {
    pub before_images: PathBuf,
    pub after_images: PathBuf,
    /// Base directory; the output directory is created underneath it.
    pub source_dir: PathBuf,
    pub settings: StepSettings,
}

impl StepConfig {
    pub fn new(
        before_images: impl Into<PathBuf>,
        after_images: impl Into<PathBuf>,
        source_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            before_images: before_images.into(),
            after_images: after_images.into(),
            source_dir: source_dir.into(),
            settings: StepSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: StepSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Reject empty inputs (an env var set to `""` still reaches us).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.before_images.as_os_str().is_empty() {
            return Err(ConfigError::Validation("before_images is required".into()));
        }
        if self.after_images.as_os_str().is_empty() {
            return Err(ConfigError::Validation("after_images is required".into()));
        }
        self.settings.validate()
    }
}

/// Load settings from `path`, or defaults when no file is given.
pub fn load_settings(path: Option<&Path>) -> Result<StepSettings, ConfigError> {
    let Some(path) = path else {
        return Ok(StepSettings::default());
    };
    let content = fs::read_to_string(path)?;
    let settings: StepSettings = toml::from_str(&content)?;
    settings.validate()?;
    Ok(settings)
}

/// A documented config file with every option at its default.
pub fn stock_config_toml() -> &'static str {
    r#"# diff-image-step configuration
# All options are optional - defaults shown below.

# How a pair is judged "changed":
#   "bounds"   - the diff image's bounds differ from the before image's
#   "explicit" - the diff engine reports inserted/deleted rows (also catches
#                screenshots that only lost rows)
change_detection = "bounds"

# Key the output directory is exported under.
export_key = "GENERATED_DIFF_IMAGES_DIR"

[style]
# Tint for rows that only exist in the before image.
deleted = [255, 0, 0]
# Tint for rows that only exist in the after image.
inserted = [0, 200, 0]
# How strongly tinted rows take on the tint colour (0.0-1.0).
strength = 0.4
# How far unchanged rows are faded toward white (0.0-1.0).
fade = 0.6
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_settings() {
        let settings = StepSettings::default();
        assert_eq!(settings.change_detection, ChangeDetection::Bounds);
        assert_eq!(settings.export_key, "GENERATED_DIFF_IMAGES_DIR");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn stock_config_matches_defaults() {
        let settings: StepSettings = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(settings, StepSettings::default());
    }

    #[test]
    fn parse_partial_config() {
        let settings: StepSettings = toml::from_str(
            r#"
            change_detection = "explicit"
            [style]
            fade = 0.0
            "#,
        )
        .unwrap();
        assert_eq!(settings.change_detection, ChangeDetection::Explicit);
        assert_eq!(settings.style.fade, 0.0);
        assert_eq!(settings.style.strength, DiffStyle::default().strength);
        assert_eq!(settings.export_key, DEFAULT_EXPORT_KEY);
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(toml::from_str::<StepSettings>("colour = 1").is_err());
        assert!(toml::from_str::<StepSettings>("[style]\nalpha = 1").is_err());
    }

    #[test]
    fn unknown_detection_mode_rejected() {
        assert!(toml::from_str::<StepSettings>("change_detection = \"pixels\"").is_err());
    }

    #[test]
    fn validate_strength_out_of_range() {
        let mut settings = StepSettings::default();
        settings.style.strength = 1.5;
        assert!(matches!(settings.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_export_key_charset() {
        let mut settings = StepSettings::default();
        settings.export_key = "BAD KEY".into();
        assert!(settings.validate().is_err());
        settings.export_key = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn load_settings_without_file_is_default() {
        assert_eq!(load_settings(None).unwrap(), StepSettings::default());
    }

    #[test]
    fn load_settings_reads_and_validates_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("diff.toml");
        std::fs::write(&path, "export_key = \"DIFFS\"").unwrap();
        assert_eq!(load_settings(Some(&path)).unwrap().export_key, "DIFFS");

        std::fs::write(&path, "[style]\nfade = -1.0").unwrap();
        assert!(matches!(
            load_settings(Some(&path)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn load_settings_missing_file_is_io_error() {
        let result = load_settings(Some(Path::new("/nonexistent/diff.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn step_config_requires_both_roots() {
        let config = StepConfig::new("", "after", ".");
        assert!(config.validate().is_err());
        let config = StepConfig::new("before", "", ".");
        assert!(config.validate().is_err());
        let config = StepConfig::new("before", "after", ".");
        assert!(config.validate().is_ok());
    }
}
