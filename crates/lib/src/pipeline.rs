//! End-to-end build orchestration.
//!
//! Runs the whole sequence for one output mode: prepare the workspace,
//! fetch depot_tools and the ANGLE checkout, build every planned target,
//! fuse the per-architecture outputs and archive the result.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::build::BuildDriver;
use crate::consts::DEFAULT_BRANCH;
use crate::exec::{CommandRunner, ExecError};
use crate::fusion::{ArtifactSet, FusionError, fuse};
use crate::package::{PackageError, PackageInputs, package};
use crate::platform::host_is_macos;
use crate::source::AngleSource;
use crate::target::{BuildTarget, OutputArtifactMode, plan};
use crate::toolchain::{Toolchain, ToolchainError};
use crate::workspace::{Workspace, WorkspaceError};

/// Options for one build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
  pub mode: OutputArtifactMode,
  pub branch: String,
  /// Commit to check out after cloning. The branch tip is used when absent.
  pub revision: Option<String>,
  /// Base directory for the workspace. Defaults to the storage base directory.
  pub storage_folder: Option<PathBuf>,
  pub artifact_output_folder: PathBuf,
  /// Delete the workspace before starting. Only logged under `dry_run`.
  pub clean: bool,
  /// Log tool invocations and stop before fusion and packaging.
  pub dry_run: bool,
}

impl BuildOptions {
  pub fn new(mode: OutputArtifactMode, artifact_output_folder: impl Into<PathBuf>) -> Self {
    Self {
      mode,
      branch: DEFAULT_BRANCH.to_string(),
      revision: None,
      storage_folder: None,
      artifact_output_folder: artifact_output_folder.into(),
      clean: false,
      dry_run: false,
    }
  }
}

/// Summary of a finished build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
  pub mode: OutputArtifactMode,
  pub branch: String,
  pub revision: Option<String>,
  pub workspace: PathBuf,
  pub checkout: PathBuf,
  pub targets: Vec<BuildTarget>,
  pub artifacts: ArtifactSet,
  /// Absent for dry runs.
  pub archive: Option<PathBuf>,
  pub dry_run: bool,
}

#[derive(Debug, Error)]
pub enum PipelineError {
  #[error(transparent)]
  Workspace(#[from] WorkspaceError),

  #[error(transparent)]
  Exec(#[from] ExecError),

  #[error("depot_tools setup failed: {0}")]
  Toolchain(#[from] ToolchainError),

  #[error("artifact fusion failed: {0}")]
  Fusion(#[from] FusionError),

  #[error("packaging failed: {0}")]
  Package(#[from] PackageError),
}

/// Run a full build for `options`, sending every tool invocation through `runner`.
pub fn run(options: &BuildOptions, runner: &dyn CommandRunner) -> Result<BuildReport, PipelineError> {
  if !host_is_macos() {
    warn!("not running on macOS; the Apple toolchain steps are expected to fail");
  }

  let workspace = Workspace::new(options.storage_folder.as_deref());
  if options.clean {
    if options.dry_run {
      info!(path = %workspace.root().display(), "dry run: would delete workspace");
    } else {
      workspace.delete_folder()?;
    }
  }
  workspace.ensure_folder()?;

  let env = Toolchain::for_workspace(&workspace).ensure(runner)?;

  let source = AngleSource::new(&workspace, options.branch.as_str(), options.revision.clone());
  let checkout = source.ensure(runner, &env)?.to_path_buf();
  source.bootstrap(runner, &env)?;
  source.sync(runner, &env)?;

  let targets = plan(options.mode);
  info!(mode = %options.mode, targets = targets.len(), "planned build targets");
  BuildDriver::new(&checkout, runner, &env).build_all(&targets)?;

  let mut report = BuildReport {
    mode: options.mode,
    branch: options.branch.clone(),
    revision: options.revision.clone(),
    workspace: workspace.root().to_path_buf(),
    checkout,
    targets,
    artifacts: ArtifactSet::default(),
    archive: None,
    dry_run: options.dry_run,
  };

  if options.dry_run {
    info!("dry run: skipping artifact fusion and packaging");
    return Ok(report);
  }

  report.artifacts = fuse(options.mode, &source.out_dir(), runner)?;

  let include_dir = source.include_dir();
  let license_file = source.license_file();
  let inputs = PackageInputs {
    artifacts: &report.artifacts,
    include_dir: &include_dir,
    license_file: &license_file,
  };
  let archive = package(&inputs, &options.artifact_output_folder, options.mode)?;
  report.archive = Some(dunce::canonicalize(&archive).unwrap_or(archive));

  info!(mode = %options.mode, "build finished");
  Ok(report)
}
