//! ANGLE source checkout management.
//!
//! One checkout exists per branch, named `angle-<branch>` with `.` replaced
//! by `_` and `/` replaced by `__`. Clones happen only when the checkout is
//! missing; an explicit revision is checked out on every run.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::consts::ANGLE_REPO_URL;
use crate::exec::{CommandRunner, ExecError, Invocation};
use crate::toolchain::ToolEnv;
use crate::workspace::Workspace;

/// Replace path-hostile characters in a branch name.
///
/// Distinct branches can share a directory: `a_b` and `a.b` both become
/// `a_b`. Upstream branches look like `chromium/6261`, so this is accepted.
pub fn underlined_branch(branch: &str) -> String {
  branch.replace('.', "_").replace('/', "__")
}

#[derive(Debug, Clone)]
pub struct AngleSource {
  branch: String,
  revision: Option<String>,
  checkout_dir: PathBuf,
}

impl AngleSource {
  pub fn new(workspace: &Workspace, branch: impl Into<String>, revision: Option<String>) -> Self {
    let branch = branch.into();
    let checkout_dir = workspace.root().join(format!("angle-{}", underlined_branch(&branch)));
    Self {
      branch,
      revision,
      checkout_dir,
    }
  }

  pub fn branch(&self) -> &str {
    &self.branch
  }

  pub fn revision(&self) -> Option<&str> {
    self.revision.as_deref()
  }

  pub fn checkout_dir(&self) -> &Path {
    &self.checkout_dir
  }

  /// Directory the per-target build outputs land in.
  pub fn out_dir(&self) -> PathBuf {
    self.checkout_dir.join("out")
  }

  pub fn include_dir(&self) -> PathBuf {
    self.checkout_dir.join("include")
  }

  pub fn license_file(&self) -> PathBuf {
    self.checkout_dir.join("LICENSE")
  }

  /// Clone the branch if the checkout is missing, then check out the revision if one was given.
  pub fn ensure(&self, runner: &dyn CommandRunner, env: &ToolEnv) -> Result<&Path, ExecError> {
    info!(branch = %self.branch, "cloning (if needed) ANGLE repository");

    if self.checkout_dir.exists() {
      info!(path = %self.checkout_dir.display(), "checkout already present, skipping clone");
    } else {
      let mut clone = Invocation::new("git")
        .args(["clone", "--branch", self.branch.as_str(), "--single-branch", ANGLE_REPO_URL])
        .path_arg(&self.checkout_dir);
      if let Some(parent) = self.checkout_dir.parent() {
        clone = clone.current_dir(parent);
      }
      runner.run(&env.apply(clone))?;
    }

    if let Some(revision) = &self.revision {
      info!(revision = %revision, "checking out revision");
      runner.run(&env.apply(
        Invocation::new("git")
          .args(["checkout", revision.as_str()])
          .current_dir(&self.checkout_dir),
      ))?;
    }

    Ok(&self.checkout_dir)
  }

  /// Run ANGLE's bootstrap script.
  pub fn bootstrap(&self, runner: &dyn CommandRunner, env: &ToolEnv) -> Result<(), ExecError> {
    info!(branch = %self.branch, "bootstrapping ANGLE repository");
    runner.run(&env.apply(
      Invocation::new("python")
        .arg("scripts/bootstrap.py")
        .current_dir(&self.checkout_dir),
    ))
  }

  /// Fetch third-party dependencies with gclient.
  pub fn sync(&self, runner: &dyn CommandRunner, env: &ToolEnv) -> Result<(), ExecError> {
    info!(branch = %self.branch, "syncing ANGLE dependencies");
    runner.run(&env.apply(Invocation::new("gclient").arg("sync").current_dir(&self.checkout_dir)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::RecordingRunner;
  use tempfile::TempDir;

  fn source(branch: &str, revision: Option<&str>) -> (TempDir, Workspace, AngleSource) {
    let temp = TempDir::new().unwrap();
    let ws = Workspace::new(Some(temp.path()));
    ws.ensure_folder().unwrap();
    let src = AngleSource::new(&ws, branch, revision.map(str::to_string));
    (temp, ws, src)
  }

  #[test]
  fn underlined_branch_replaces_separators() {
    assert_eq!(underlined_branch("chromium/6045"), "chromium__6045");
    assert_eq!(underlined_branch("release/1.2"), "release__1_2");
  }

  #[test]
  fn dot_and_slash_do_not_collide() {
    assert_ne!(underlined_branch("a.b"), underlined_branch("a/b"));
  }

  #[test]
  fn underscore_and_dot_share_a_directory() {
    assert_eq!(underlined_branch("a_b"), underlined_branch("a.b"));
  }

  #[test]
  fn checkout_dir_uses_underlined_branch() {
    let (_temp, ws, src) = source("chromium/6045", None);
    assert_eq!(src.checkout_dir(), ws.root().join("angle-chromium__6045"));
    assert_eq!(src.out_dir(), ws.root().join("angle-chromium__6045").join("out"));
  }

  #[test]
  fn ensure_clones_single_branch_when_absent() {
    let (_temp, ws, src) = source("chromium/6261", None);
    let runner = RecordingRunner::new();

    src.ensure(&runner, &ToolEnv::default()).unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
      calls[0].args[..5],
      ["clone", "--branch", "chromium/6261", "--single-branch", ANGLE_REPO_URL]
    );
    assert_eq!(calls[0].cwd.as_deref(), Some(ws.root()));
  }

  #[test]
  fn ensure_skips_clone_when_present() {
    let (_temp, _ws, src) = source("chromium/6261", None);
    std::fs::create_dir_all(src.checkout_dir()).unwrap();
    let runner = RecordingRunner::new();

    src.ensure(&runner, &ToolEnv::default()).unwrap();

    assert!(runner.calls().is_empty());
  }

  #[test]
  fn ensure_checks_out_requested_revision() {
    let (_temp, _ws, src) = source("chromium/6261", Some("abc123"));
    std::fs::create_dir_all(src.checkout_dir()).unwrap();
    let runner = RecordingRunner::new();

    src.ensure(&runner, &ToolEnv::default()).unwrap();

    assert_eq!(runner.command_lines(), ["git checkout abc123"]);
    assert_eq!(runner.calls()[0].cwd.as_deref(), Some(src.checkout_dir()));
  }

  #[test]
  fn ensure_failure_is_fatal() {
    let (_temp, _ws, src) = source("chromium/6261", Some("abc123"));
    let runner = RecordingRunner::failing_on("git");

    assert!(src.ensure(&runner, &ToolEnv::default()).is_err());
    assert_eq!(runner.calls().len(), 1);
  }

  #[test]
  fn bootstrap_and_sync_run_in_checkout_with_tool_env() {
    let (_temp, _ws, src) = source("chromium/6261", None);
    let env = ToolEnv::with_tool_dir(Path::new("/tools/depot_tools"), None).unwrap();
    let runner = RecordingRunner::new();

    src.bootstrap(&runner, &env).unwrap();
    src.sync(&runner, &env).unwrap();

    assert_eq!(runner.command_lines(), ["python scripts/bootstrap.py", "gclient sync"]);
    for call in runner.calls() {
      assert_eq!(call.cwd.as_deref(), Some(src.checkout_dir()));
      assert_eq!(call.env.get("PATH"), Some(&"/tools/depot_tools".into()));
    }
  }
}
