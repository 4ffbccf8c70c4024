//! External tool invocation.
//!
//! Every tool this crate drives (git, gn, autoninja, lipo, install_name_tool,
//! plutil, xcodebuild, gclient) goes through a [`CommandRunner`]. Invocations
//! carry their own environment, so the toolchain location is passed
//! explicitly instead of being written into the process-wide `PATH`.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ExecError {
  /// The program could not be started at all.
  #[error("failed to start '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The program ran and exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {cmd}")]
  Failed { cmd: String, code: Option<i32> },
}

/// A fully described process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: Option<PathBuf>,
  pub env: BTreeMap<String, OsString>,
}

impl Invocation {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: None,
      env: BTreeMap::new(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  /// Append a path argument, converted lossily to a string.
  pub fn path_arg(self, path: impl AsRef<Path>) -> Self {
    let arg = path.as_ref().to_string_lossy().into_owned();
    self.arg(arg)
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }

  pub fn envs(mut self, vars: &BTreeMap<String, OsString>) -> Self {
    for (key, value) in vars {
      self.env.insert(key.clone(), value.clone());
    }
    self
  }

  /// The program followed by its arguments, space separated.
  pub fn command_line(&self) -> String {
    std::iter::once(self.program.as_str())
      .chain(self.args.iter().map(String::as_str))
      .collect::<Vec<_>>()
      .join(" ")
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.command_line())
  }
}

/// Runs invocations to completion, one at a time.
pub trait CommandRunner {
  fn run(&self, invocation: &Invocation) -> Result<(), ExecError>;
}

/// Spawns real processes with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
  fn run(&self, invocation: &Invocation) -> Result<(), ExecError> {
    info!(cmd = %invocation, "executing command");

    let mut command = Command::new(&invocation.program);
    command.args(&invocation.args).envs(&invocation.env);
    if let Some(cwd) = &invocation.cwd {
      command.current_dir(cwd);
    }

    debug!(cwd = ?invocation.cwd, env = ?invocation.env.keys().collect::<Vec<_>>(), "spawning process");

    let status = command.status().map_err(|source| ExecError::Spawn {
      program: invocation.program.clone(),
      source,
    })?;

    if !status.success() {
      return Err(ExecError::Failed {
        cmd: invocation.command_line(),
        code: status.code(),
      });
    }

    Ok(())
  }
}

/// Logs and records invocations without running anything.
#[derive(Debug, Default)]
pub struct DryRunRunner {
  recorded: Mutex<Vec<Invocation>>,
}

impl DryRunRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Everything that would have run, in order.
  pub fn invocations(&self) -> Vec<Invocation> {
    self.recorded.lock().map(|r| r.clone()).unwrap_or_default()
  }
}

impl CommandRunner for DryRunRunner {
  fn run(&self, invocation: &Invocation) -> Result<(), ExecError> {
    info!(cmd = %invocation, cwd = ?invocation.cwd, "dry run: skipping command");
    if let Ok(mut recorded) = self.recorded.lock() {
      recorded.push(invocation.clone());
    }
    Ok(())
  }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
  fn run(&self, invocation: &Invocation) -> Result<(), ExecError> {
    (**self).run(invocation)
  }
}
