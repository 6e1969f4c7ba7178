//! Exposing the run result to the surrounding CI system.
//!
//! After all pairs are processed, the absolute output directory is published
//! under a named key (default `GENERATED_DIFF_IMAGES_DIR`). On Bitrise that
//! means `bitrise envman add --key … --value …`; elsewhere the value can be
//! printed or dropped.
//!
//! A publish failure is fatal to the run.

use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use thiserror::Error;

/// Key the output directory is exported under unless configured otherwise.
pub const DEFAULT_EXPORT_KEY: &str = "GENERATED_DIFF_IMAGES_DIR";

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to expose output with envman ({status}): {output}")]
    Failed { status: ExitStatus, output: String },
}

/// Something that can hand a named result value to the CI system.
pub trait ResultPublisher {
    fn publish(&self, key: &str, value: &str) -> Result<(), PublishError>;
}

/// Publisher selection for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PublisherKind {
    /// `bitrise envman add --key KEY --value VALUE`
    #[default]
    Envman,
    /// Print `KEY=VALUE` to stdout
    Stdout,
    /// Do not publish
    None,
}

impl PublisherKind {
    pub fn build(self) -> Box<dyn ResultPublisher> {
        match self {
            PublisherKind::Envman => Box::new(EnvmanPublisher::default()),
            PublisherKind::Stdout => Box::new(StdoutPublisher),
            PublisherKind::None => Box::new(NoopPublisher),
        }
    }
}

/// Runs envman to add the value to the step's exported environment.
#[derive(Debug, Clone)]
pub struct EnvmanPublisher {
    program: PathBuf,
    leading_args: Vec<String>,
}

impl EnvmanPublisher {
    /// Run `program leading_args… add --key KEY --value VALUE`.
    pub fn with_command(program: impl Into<PathBuf>, leading_args: &[&str]) -> Self {
        Self {
            program: program.into(),
            leading_args: leading_args.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn describe(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.leading_args.iter().cloned());
        parts.join(" ")
    }
}

impl Default for EnvmanPublisher {
    fn default() -> Self {
        Self::with_command("bitrise", &["envman"])
    }
}

impl ResultPublisher for EnvmanPublisher {
    fn publish(&self, key: &str, value: &str) -> Result<(), PublishError> {
        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .args(["add", "--key", key, "--value", value])
            .output()
            .map_err(|source| PublishError::Spawn {
                command: self.describe(),
                source,
            })?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(PublishError::Failed {
                status: output.status,
                output: combined.trim().to_string(),
            });
        }

        tracing::info!(key, value, "exported result");
        Ok(())
    }
}

/// Prints `KEY=VALUE`, for runs outside Bitrise.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutPublisher;

impl ResultPublisher for StdoutPublisher {
    fn publish(&self, key: &str, value: &str) -> Result<(), PublishError> {
        println!("{key}={value}");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

impl ResultPublisher for NoopPublisher {
    fn publish(&self, _key: &str, _value: &str) -> Result<(), PublishError> {
        Ok(())
    }
}
