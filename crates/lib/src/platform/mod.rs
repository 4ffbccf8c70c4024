pub mod arch;
pub mod os;
pub mod paths;

use arch::Cpu;
use os::TargetOs;
use std::fmt;

pub use os::host_is_macos;

/// Target identifier combining platform and CPU (e.g., "iphonesimulator-arm64")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
  pub os: TargetOs,
  pub cpu: Cpu,
}

impl Platform {
  /// Create a new platform identifier
  pub const fn new(os: TargetOs, cpu: Cpu) -> Self {
    Self { os, cpu }
  }

  /// Returns the platform pair string (e.g., "macos-x64")
  pub fn pair(&self) -> String {
    format!("{}-{}", self.os, self.cpu)
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.pair())
  }
}
