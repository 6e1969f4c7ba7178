use clap::{Parser, Subcommand};
use diff_image_step::config::{self, StepConfig};
use diff_image_step::imaging::{OUTPUT_DIR_NAME, RowDiffEngine};
use diff_image_step::logging::{self, LogFormat};
use diff_image_step::output;
use diff_image_step::pipeline::{self, RunReport};
use diff_image_step::publish::PublisherKind;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "diff-image-step")]
#[command(about = "Render diff images for screenshots that changed")]
#[command(long_about = "\
Render diff images for screenshots that changed

Compares before/after screenshots and writes a PNG diff for every after image
that changed into <source-dir>/diff_image_output. The directory's absolute
path is then exported as GENERATED_DIFF_IMAGES_DIR.

Inputs must be two files or two directories:

  before/              after/
  ├── home.png   ←→    ├── home.png      compared
  └── old.png          ├── signup.png    compared against an empty image
                       └── notes.txt     ignored (only .png is picked up)

Run 'diff-image-step gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Before image, or directory of before images
    #[arg(long, env = "before_images")]
    before_images: Option<PathBuf>,

    /// After image, or directory of after images
    #[arg(long, env = "after_images")]
    after_images: Option<PathBuf>,

    /// Base directory the output directory is created in
    #[arg(long, env = "BITRISE_SOURCE_DIR", default_value = ".")]
    source_dir: PathBuf,

    /// Optional TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// How to export the output directory
    #[arg(long, value_enum, default_value_t)]
    publisher: PublisherKind,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Exit with status 1 when any pair failed
    #[arg(long)]
    strict: bool,

    /// Log line format (filter with RUST_LOG)
    #[arg(long, value_enum, default_value_t)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Compare the images (default)
    Run,
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_format);

    match cli.command {
        Some(Command::GenConfig) => {
            print!("{}", config::stock_config_toml());
            ExitCode::SUCCESS
        }
        Some(Command::Run) | None => match run(&cli) {
            Ok(code) => code,
            Err(e) => {
                tracing::error!(error = %e, "run failed");
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let settings = config::load_settings(cli.config.as_deref())?;
    let step = StepConfig::new(
        cli.before_images.clone().unwrap_or_default(),
        cli.after_images.clone().unwrap_or_default(),
        &cli.source_dir,
    )
    .with_settings(settings);
    step.validate()?;
    output::print_config(&step, &step.source_dir.join(OUTPUT_DIR_NAME));

    let engine = RowDiffEngine::new(step.settings.style);
    let publisher = cli.publisher.build();
    let mut index = 0;
    let report = pipeline::run(&step, &engine, publisher.as_ref(), |outcome| {
        index += 1;
        for line in output::format_pair_outcome(index, outcome) {
            println!("{}", line);
        }
    })?;
    output::print_summary(&report);

    if let Some(path) = &cli.report {
        write_report(&report, path)?;
    }

    if cli.strict && report.has_failures() {
        eprintln!("Error: {} pair(s) failed", report.failed());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn write_report(report: &RunReport, path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
