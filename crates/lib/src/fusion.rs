//! Multi-architecture artifact fusion.
//!
//! Turns the per-target outputs under `<checkout>/out/` into the deliverable
//! for an [`OutputArtifactMode`]:
//!
//! - single-architecture modes hand back the compiled dylibs or frameworks
//!   as they are;
//! - `macos-universal` merges the x64 and arm64 dylibs with `lipo` and
//!   rewrites their install name to `@rpath/<lib>.dylib`;
//! - `iphoneall-universal` merges both simulator slices into one framework,
//!   then combines it with the device framework into an xcframework.
//!
//! Every expected input is checked before any scratch directory is touched,
//! so a missing slice fails the run without leaving partial results behind.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::LIBRARIES;
use crate::exec::{CommandRunner, ExecError, Invocation};
use crate::target::{OutputArtifactMode, TargetName};
use crate::util::fs::{copy_tree_except, recreate_dir};

/// Scratch directory holding the merged simulator frameworks.
const SIMULATOR_UNIVERSAL_DIR: &str = "iphonesimulator-universal";

#[derive(Debug, Error)]
pub enum FusionError {
  /// A constituent build did not leave the expected output behind.
  #[error("expected build output is missing: {}", path.display())]
  MissingInput { path: PathBuf },

  #[error("filesystem error at {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error(transparent)]
  Exec(#[from] ExecError),
}

/// The ordered paths making up a deliverable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactSet(pub Vec<PathBuf>);

impl ArtifactSet {
  pub fn paths(&self) -> &[PathBuf] {
    &self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// How a mode's deliverable is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionStrategy {
  /// Return the dylibs of a single macOS target.
  MacDylibs(TargetName),
  /// lipo the x64 and arm64 dylibs into fat dylibs.
  MacUniversal,
  /// Return the frameworks of a single iOS target.
  IosFrameworks(TargetName),
  /// Merge simulator slices, then build xcframeworks with the device slice.
  IosXcframework,
}

impl FusionStrategy {
  pub fn for_mode(mode: OutputArtifactMode) -> Self {
    match mode {
      OutputArtifactMode::MacosX64 => Self::MacDylibs(TargetName::MacosX64),
      OutputArtifactMode::MacosArm64 => Self::MacDylibs(TargetName::MacosArm64),
      OutputArtifactMode::MacosUniversal => Self::MacUniversal,
      OutputArtifactMode::IphoneosArm64 => Self::IosFrameworks(TargetName::IphoneosArm64),
      OutputArtifactMode::IphonesimulatorX64 => Self::IosFrameworks(TargetName::IphonesimulatorX64),
      OutputArtifactMode::IphonesimulatorArm64 => Self::IosFrameworks(TargetName::IphonesimulatorArm64),
      OutputArtifactMode::IphoneallUniversal => Self::IosXcframework,
    }
  }
}

/// Path helpers for the `out/` tree of one checkout.
#[derive(Debug, Clone, Copy)]
struct OutLayout<'a> {
  root: &'a Path,
}

impl OutLayout<'_> {
  fn dir(&self, name: &str) -> PathBuf {
    self.root.join(name)
  }

  fn dylib(&self, dir: &str, lib: &str) -> PathBuf {
    self.dir(dir).join(format!("{lib}.dylib"))
  }

  fn framework(&self, dir: &str, lib: &str) -> PathBuf {
    self.dir(dir).join(format!("{lib}.framework"))
  }

  fn framework_binary(&self, dir: &str, lib: &str) -> PathBuf {
    self.framework(dir, lib).join(lib)
  }

  fn xcframework(&self, dir: &str, lib: &str) -> PathBuf {
    self.dir(dir).join(format!("{lib}.xcframework"))
  }
}

fn require_inputs(paths: &[PathBuf]) -> Result<(), FusionError> {
  for path in paths {
    if !path.exists() {
      return Err(FusionError::MissingInput { path: path.clone() });
    }
    debug!(path = %path.display(), "fusion input present");
  }
  Ok(())
}

fn recreate(dir: &Path) -> Result<(), FusionError> {
  recreate_dir(dir).map_err(|source| FusionError::Io {
    path: dir.to_path_buf(),
    source,
  })
}

/// Assemble the deliverable for `mode` from the compiled outputs under `out_root`.
///
/// Must only be called after every target in `plan(mode)` compiled.
pub fn fuse(mode: OutputArtifactMode, out_root: &Path, runner: &dyn CommandRunner) -> Result<ArtifactSet, FusionError> {
  let layout = OutLayout { root: out_root };
  let strategy = FusionStrategy::for_mode(mode);
  info!(mode = %mode, strategy = ?strategy, "assembling artifacts");

  let artifacts = match strategy {
    FusionStrategy::MacDylibs(target) => mac_dylibs(&layout, target)?,
    FusionStrategy::IosFrameworks(target) => ios_frameworks(&layout, target)?,
    FusionStrategy::MacUniversal => mac_universal(&layout, mode, runner)?,
    FusionStrategy::IosXcframework => ios_xcframework(&layout, mode, runner)?,
  };

  info!(mode = %mode, count = artifacts.len(), "artifacts ready");
  Ok(artifacts)
}

fn mac_dylibs(layout: &OutLayout<'_>, target: TargetName) -> Result<ArtifactSet, FusionError> {
  let paths: Vec<PathBuf> = LIBRARIES.iter().map(|lib| layout.dylib(target.as_str(), lib)).collect();
  require_inputs(&paths)?;
  Ok(ArtifactSet(paths))
}

/// The framework bundles of one iOS target. A bundle without its binary is not an output.
fn ios_frameworks(layout: &OutLayout<'_>, target: TargetName) -> Result<ArtifactSet, FusionError> {
  let dir = target.as_str();
  let binaries: Vec<PathBuf> = LIBRARIES.iter().map(|lib| layout.framework_binary(dir, lib)).collect();
  require_inputs(&binaries)?;
  Ok(ArtifactSet(
    LIBRARIES.iter().map(|lib| layout.framework(dir, lib)).collect(),
  ))
}

fn mac_universal(
  layout: &OutLayout<'_>,
  mode: OutputArtifactMode,
  runner: &dyn CommandRunner,
) -> Result<ArtifactSet, FusionError> {
  let x64 = TargetName::MacosX64.as_str();
  let arm64 = TargetName::MacosArm64.as_str();
  let universal = mode.as_str();

  let inputs: Vec<PathBuf> = LIBRARIES
    .iter()
    .flat_map(|lib| [layout.dylib(x64, lib), layout.dylib(arm64, lib)])
    .collect();
  require_inputs(&inputs)?;

  recreate(&layout.dir(universal))?;

  let mut merged = Vec::new();
  for lib in LIBRARIES {
    let output = layout.dylib(universal, lib);
    info!(lib, output = %output.display(), "merging macOS dylibs");

    runner.run(
      &Invocation::new("lipo")
        .arg("-create")
        .path_arg(layout.dylib(x64, lib))
        .path_arg(layout.dylib(arm64, lib))
        .arg("-output")
        .path_arg(&output),
    )?;

    runner.run(
      &Invocation::new("install_name_tool")
        .args(["-id".to_string(), format!("@rpath/{lib}.dylib")])
        .path_arg(&output),
    )?;

    merged.push(output);
  }

  Ok(ArtifactSet(merged))
}

fn ios_xcframework(
  layout: &OutLayout<'_>,
  mode: OutputArtifactMode,
  runner: &dyn CommandRunner,
) -> Result<ArtifactSet, FusionError> {
  let device = TargetName::IphoneosArm64.as_str();
  let sim_x64 = TargetName::IphonesimulatorX64.as_str();
  let sim_arm64 = TargetName::IphonesimulatorArm64.as_str();
  let universal = mode.as_str();

  let inputs: Vec<PathBuf> = LIBRARIES
    .iter()
    .flat_map(|lib| {
      [
        layout.framework_binary(device, lib),
        layout.framework_binary(sim_x64, lib),
        layout.framework_binary(sim_arm64, lib),
      ]
    })
    .collect();
  require_inputs(&inputs)?;

  recreate(&layout.dir(universal))?;
  recreate(&layout.dir(SIMULATOR_UNIVERSAL_DIR))?;

  let mut xcframeworks = Vec::new();
  for lib in LIBRARIES {
    let sim_framework = layout.framework(SIMULATOR_UNIVERSAL_DIR, lib);
    info!(lib, framework = %sim_framework.display(), "merging simulator frameworks");

    copy_tree_except(&layout.framework(sim_x64, lib), &sim_framework, &[PathBuf::from(lib)]).map_err(|source| {
      FusionError::Io {
        path: sim_framework.clone(),
        source,
      }
    })?;

    runner.run(
      &Invocation::new("lipo")
        .arg("-create")
        .path_arg(layout.framework_binary(sim_x64, lib))
        .path_arg(layout.framework_binary(sim_arm64, lib))
        .arg("-output")
        .path_arg(layout.framework_binary(SIMULATOR_UNIVERSAL_DIR, lib)),
    )?;

    let output = layout.xcframework(universal, lib);
    info!(lib, output = %output.display(), "creating xcframework");

    runner.run(
      &Invocation::new("xcodebuild")
        .arg("-create-xcframework")
        .arg("-framework")
        .path_arg(layout.framework(device, lib))
        .arg("-framework")
        .path_arg(&sim_framework)
        .arg("-output")
        .path_arg(&output),
    )?;

    xcframeworks.push(output);
  }

  Ok(ArtifactSet(xcframeworks))
}
