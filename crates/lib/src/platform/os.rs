use std::fmt;

use serde::Serialize;

/// Apple platform a target is compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetOs {
  Mac,
  IphoneOs,
  IphoneSimulator,
}

impl TargetOs {
  /// Returns the `target_os` value passed to `gn`
  pub fn gn_os(&self) -> &'static str {
    match self {
      Self::Mac => "mac",
      Self::IphoneOs | Self::IphoneSimulator => "ios",
    }
  }

  /// Whether the platform is one of the iOS variants
  pub fn is_ios(&self) -> bool {
    matches!(self, Self::IphoneOs | Self::IphoneSimulator)
  }

  pub fn is_simulator(&self) -> bool {
    matches!(self, Self::IphoneSimulator)
  }

  /// Returns the lowercase identifier used in target names
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Mac => "macos",
      Self::IphoneOs => "iphoneos",
      Self::IphoneSimulator => "iphonesimulator",
    }
  }
}

impl fmt::Display for TargetOs {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Whether the current process runs on macOS, where the fusion tools live
pub fn host_is_macos() -> bool {
  std::env::consts::OS == "macos"
}
