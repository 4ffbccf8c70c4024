//! Per-target configuration and compilation.
//!
//! For a planned list of [`BuildTarget`]s the driver first generates every
//! output directory with `gn gen`, then compiles each target with
//! `autoninja` in plan order. iOS frameworks get their Info.plist patched
//! right after their target compiles, so every bundle fusion later consumes
//! is already complete.

pub mod bundle;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::consts::LIBRARIES;
use crate::exec::{CommandRunner, ExecError, Invocation};
use crate::target::BuildTarget;
use crate::toolchain::ToolEnv;

/// Runs `gn` and `autoninja` inside one ANGLE checkout.
pub struct BuildDriver<'a> {
  checkout: &'a Path,
  runner: &'a dyn CommandRunner,
  env: &'a ToolEnv,
}

impl<'a> BuildDriver<'a> {
  pub fn new(checkout: &'a Path, runner: &'a dyn CommandRunner, env: &'a ToolEnv) -> Self {
    Self { checkout, runner, env }
  }

  /// `out/<target>` relative to the checkout, as passed to the tools.
  fn relative_out_dir(target: &BuildTarget) -> String {
    format!("out/{}", target.name)
  }

  /// Absolute output directory for `target`.
  pub fn out_dir(&self, target: &BuildTarget) -> PathBuf {
    self.checkout.join("out").join(target.name.as_str())
  }

  pub fn generate(&self, target: &BuildTarget) -> Result<(), ExecError> {
    info!(target = %target.name, "running gn gen");
    self.runner.run(
      &self.env.apply(
        Invocation::new("gn")
          .args(["gen".to_string(), Self::relative_out_dir(target)])
          .arg(format!("--args={}", target.gn_args_string()))
          .current_dir(self.checkout),
      ),
    )
  }

  pub fn compile(&self, target: &BuildTarget) -> Result<(), ExecError> {
    info!(target = %target.name, "running autoninja");
    self.runner.run(
      &self.env.apply(
        Invocation::new("autoninja")
          .args(["-C".to_string(), Self::relative_out_dir(target)])
          .args(LIBRARIES)
          .current_dir(self.checkout),
      ),
    )
  }

  /// Patch the Info.plist of both frameworks produced by an iOS target.
  fn patch_frameworks(&self, target: &BuildTarget) -> Result<(), ExecError> {
    let out_dir = self.out_dir(target);
    for lib in LIBRARIES {
      bundle::patch_short_version(self.runner, &out_dir.join(format!("{lib}.framework")))?;
    }
    Ok(())
  }

  /// Generate all targets, then compile them one after another.
  pub fn build_all(&self, targets: &[BuildTarget]) -> Result<(), ExecError> {
    for target in targets {
      self.generate(target)?;
    }

    for target in targets {
      self.compile(target)?;
      if target.name.platform().os.is_ios() {
        self.patch_frameworks(target)?;
      }
    }

    info!(count = targets.len(), "all targets compiled");
    Ok(())
  }
}
