mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use angle_builder_lib::consts::{DEFAULT_ARTIFACT_DIR, DEFAULT_BRANCH};
use angle_builder_lib::{BuildOptions, OutputArtifactMode};

use crate::output::{OutputFormat, print_error};

/// Build ANGLE (libEGL and libGLESv2) for macOS and iOS
#[derive(Parser)]
#[command(name = "angle-builder")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Artifact shape to produce
  #[arg(value_enum, value_name = "OUTPUT_ARTIFACT_MODE")]
  mode: ModeArg,

  /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
  #[arg(short, long, action = ArgAction::Count)]
  verbose: u8,

  /// ANGLE branch to build
  #[arg(long, default_value = DEFAULT_BRANCH)]
  branch: String,

  /// Commit to check out instead of the branch tip
  #[arg(long)]
  revision: Option<String>,

  /// Directory holding the .angle-builder workspace (default: $ANGLE_BUILDER_STORAGE or $HOME)
  #[arg(long)]
  storage_folder: Option<PathBuf>,

  /// Directory the archive is written to (default: ./angle-artifacts)
  #[arg(long)]
  artifact_output_folder: Option<PathBuf>,

  /// Delete the workspace before building
  #[arg(long)]
  clean: bool,

  /// Print the tool invocations without running them
  #[arg(long)]
  dry_run: bool,

  /// Output format
  #[arg(short = 'o', long, value_enum, default_value = "text")]
  output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
  MacosX64,
  MacosArm64,
  MacosUniversal,
  IphoneosArm64,
  IphonesimulatorX64,
  IphonesimulatorArm64,
  IphoneallUniversal,
}

impl From<ModeArg> for OutputArtifactMode {
  fn from(mode: ModeArg) -> Self {
    match mode {
      ModeArg::MacosX64 => Self::MacosX64,
      ModeArg::MacosArm64 => Self::MacosArm64,
      ModeArg::MacosUniversal => Self::MacosUniversal,
      ModeArg::IphoneosArm64 => Self::IphoneosArm64,
      ModeArg::IphonesimulatorX64 => Self::IphonesimulatorX64,
      ModeArg::IphonesimulatorArm64 => Self::IphonesimulatorArm64,
      ModeArg::IphoneallUniversal => Self::IphoneallUniversal,
    }
  }
}

fn init_logging(verbose: u8) {
  let level = if verbose >= 2 { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn build_options(cli: Cli) -> Result<BuildOptions> {
  let artifact_output_folder = match cli.artifact_output_folder {
    Some(folder) => folder,
    None => std::env::current_dir()
      .context("Failed to determine current directory")?
      .join(DEFAULT_ARTIFACT_DIR),
  };

  Ok(BuildOptions {
    mode: cli.mode.into(),
    branch: cli.branch,
    revision: cli.revision,
    storage_folder: cli.storage_folder,
    artifact_output_folder,
    clean: cli.clean,
    dry_run: cli.dry_run,
  })
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let output = cli.output;
  let result = build_options(cli).and_then(|options| cmd::cmd_build(&options, output));

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{err:#}"));
      ExitCode::FAILURE
    }
  }
}
