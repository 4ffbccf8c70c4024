//! depot_tools checkout and the tool environment derived from it.
//!
//! The toolchain is never registered on the process-wide `PATH`. Instead
//! [`Toolchain::ensure`] returns a [`ToolEnv`] whose `PATH` value has the
//! depot_tools directory prepended, and every invocation that needs
//! `gn`, `autoninja` or `gclient` carries it explicitly.

use std::collections::BTreeMap;
use std::env::JoinPathsError;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::consts::{DEPOT_TOOLS_DIR_NAME, DEPOT_TOOLS_REPO_URL};
use crate::exec::{CommandRunner, ExecError, Invocation};
use crate::workspace::Workspace;

#[derive(Debug, Error)]
pub enum ToolchainError {
  /// The tool directory cannot be joined into a `PATH` value (e.g. it contains the separator).
  #[error("cannot add {} to PATH: {source}", dir.display())]
  InvalidPath {
    dir: PathBuf,
    #[source]
    source: JoinPathsError,
  },

  #[error(transparent)]
  Exec(#[from] ExecError),
}

/// Environment applied to tool invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolEnv {
  vars: BTreeMap<String, OsString>,
}

impl ToolEnv {
  /// Build an environment whose `PATH` is `base_path` with `tool_dir` in front.
  ///
  /// `tool_dir` is not added twice if `base_path` already contains it.
  /// Entries are kept as raw OS strings, so non-UTF-8 directories survive.
  pub fn with_tool_dir(tool_dir: &Path, base_path: Option<OsString>) -> Result<Self, ToolchainError> {
    let mut entries: Vec<PathBuf> = base_path
      .as_deref()
      .map(|p| std::env::split_paths(p).collect())
      .unwrap_or_default();

    if !entries.iter().any(|e| e == tool_dir) {
      entries.insert(0, tool_dir.to_path_buf());
    }

    let joined = std::env::join_paths(&entries).map_err(|source| ToolchainError::InvalidPath {
      dir: tool_dir.to_path_buf(),
      source,
    })?;

    let mut vars = BTreeMap::new();
    vars.insert("PATH".to_string(), joined);
    Ok(Self { vars })
  }

  pub fn vars(&self) -> &BTreeMap<String, OsString> {
    &self.vars
  }

  pub fn path(&self) -> Option<&OsStr> {
    self.vars.get("PATH").map(OsString::as_os_str)
  }

  /// Attach this environment to an invocation.
  pub fn apply(&self, invocation: Invocation) -> Invocation {
    invocation.envs(&self.vars)
  }
}

/// The depot_tools checkout inside the workspace.
#[derive(Debug, Clone)]
pub struct Toolchain {
  dir: PathBuf,
}

impl Toolchain {
  pub fn for_workspace(workspace: &Workspace) -> Self {
    Self {
      dir: workspace.root().join(DEPOT_TOOLS_DIR_NAME),
    }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  /// Clone depot_tools if absent and return the environment exposing it.
  pub fn ensure(&self, runner: &dyn CommandRunner) -> Result<ToolEnv, ToolchainError> {
    info!(path = %self.dir.display(), "ensuring depot_tools is available");

    // Fail on an unusable PATH before cloning anything.
    let env = self.tool_env()?;

    if self.dir.exists() {
      info!("depot_tools already present, skipping clone");
    } else {
      info!(url = DEPOT_TOOLS_REPO_URL, "cloning depot_tools");
      runner.run(
        &Invocation::new("git")
          .args(["clone", DEPOT_TOOLS_REPO_URL])
          .path_arg(&self.dir),
      )?;
    }

    Ok(env)
  }

  /// The tool environment based on the current process `PATH`.
  pub fn tool_env(&self) -> Result<ToolEnv, ToolchainError> {
    ToolEnv::with_tool_dir(&self.dir, std::env::var_os("PATH"))
  }
}
