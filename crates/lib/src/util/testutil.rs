//! Test utilities for angle-builder-lib.
//!
//! Cross-platform shell helpers plus a recording [`CommandRunner`] and
//! fixtures that lay out compiled outputs the way `autoninja` leaves them.

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use crate::consts::LIBRARIES;
use crate::exec::{CommandRunner, ExecError, Invocation};
use crate::target::TargetName;

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Returns the command and args to create a marker file in the current directory.
#[cfg(unix)]
pub fn touch_file(filename: &str) -> (&'static str, Vec<String>) {
  ("/usr/bin/touch", vec![filename.to_string()])
}

#[cfg(windows)]
pub fn touch_file(filename: &str) -> (&'static str, Vec<String>) {
  (
    "powershell.exe",
    vec![
      "-NoProfile".to_string(),
      "-Command".to_string(),
      format!("New-Item -ItemType File -Path '{}' -Force | Out-Null", filename),
    ],
  )
}

type Effect = Box<dyn Fn(&Invocation)>;

/// Records every invocation; optionally fails on a program or simulates its output.
#[derive(Default)]
pub struct RecordingRunner {
  calls: RefCell<Vec<Invocation>>,
  fail_program: Option<String>,
  effect: Option<Effect>,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Fail (exit code 1) whenever `program` is invoked.
  pub fn failing_on(program: &str) -> Self {
    Self {
      fail_program: Some(program.to_string()),
      ..Self::default()
    }
  }

  /// Run `effect` for every successful invocation, e.g. to create expected outputs.
  pub fn with_effect(mut self, effect: impl Fn(&Invocation) + 'static) -> Self {
    self.effect = Some(Box::new(effect));
    self
  }

  pub fn calls(&self) -> Vec<Invocation> {
    self.calls.borrow().clone()
  }

  pub fn programs(&self) -> Vec<String> {
    self.calls.borrow().iter().map(|c| c.program.clone()).collect()
  }

  pub fn command_lines(&self) -> Vec<String> {
    self.calls.borrow().iter().map(Invocation::command_line).collect()
  }
}

impl CommandRunner for RecordingRunner {
  fn run(&self, invocation: &Invocation) -> Result<(), ExecError> {
    self.calls.borrow_mut().push(invocation.clone());

    if self.fail_program.as_deref() == Some(invocation.program.as_str()) {
      return Err(ExecError::Failed {
        cmd: invocation.command_line(),
        code: Some(1),
      });
    }

    if let Some(effect) = &self.effect {
      effect(invocation);
    }
    Ok(())
  }
}

/// Lay out what compiling `target` leaves under `out_root/<target>/`.
///
/// macOS targets get `lib*.dylib` files; iOS targets get `lib*.framework`
/// bundles with a binary, an `Info.plist` and a `Headers/` directory.
pub fn fake_compiled_outputs(out_root: &Path, target: TargetName) {
  let dir = out_root.join(target.as_str());
  fs::create_dir_all(&dir).unwrap();

  for lib in LIBRARIES {
    if target.platform().os.is_ios() {
      let framework = dir.join(format!("{lib}.framework"));
      fs::create_dir_all(framework.join("Headers")).unwrap();
      fs::write(framework.join(lib), format!("{} binary", target)).unwrap();
      fs::write(framework.join("Info.plist"), "<plist/>").unwrap();
      fs::write(framework.join("Headers").join(format!("{lib}.h")), "// header").unwrap();
    } else {
      fs::write(dir.join(format!("{lib}.dylib")), format!("{} dylib", target)).unwrap();
    }
  }
}
