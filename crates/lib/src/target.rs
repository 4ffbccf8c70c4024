//! Build-target planning.
//!
//! Maps a requested [`OutputArtifactMode`] to the ordered list of
//! per-architecture [`BuildTarget`]s that must be compiled before the
//! artifacts for that mode can be assembled. Composite modes expand to the
//! union of their constituent single-architecture targets, in a fixed order.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::platform::Platform;
use crate::platform::arch::Cpu;
use crate::platform::os::TargetOs;

/// Arguments shared by every target.
const COMMON_GN_ARGS: [&str; 4] = [
  "is_component_build=false",
  "is_debug=false",
  "angle_enable_wgpu=false",
  "mac_deployment_target=\"10.15\"",
];

/// Returned when a string does not name one of the output artifact modes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output artifact mode '{0}' (expected one of: {modes})", modes = OutputArtifactMode::names().join(", "))]
pub struct ParseModeError(pub String);

/// The shape of the deliverable requested for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputArtifactMode {
  MacosX64,
  MacosArm64,
  MacosUniversal,
  IphoneosArm64,
  IphonesimulatorX64,
  IphonesimulatorArm64,
  IphoneallUniversal,
}

impl OutputArtifactMode {
  pub const ALL: [OutputArtifactMode; 7] = [
    Self::MacosX64,
    Self::MacosArm64,
    Self::MacosUniversal,
    Self::IphoneosArm64,
    Self::IphonesimulatorX64,
    Self::IphonesimulatorArm64,
    Self::IphoneallUniversal,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::MacosX64 => "macos-x64",
      Self::MacosArm64 => "macos-arm64",
      Self::MacosUniversal => "macos-universal",
      Self::IphoneosArm64 => "iphoneos-arm64",
      Self::IphonesimulatorX64 => "iphonesimulator-x64",
      Self::IphonesimulatorArm64 => "iphonesimulator-arm64",
      Self::IphoneallUniversal => "iphoneall-universal",
    }
  }

  pub fn names() -> Vec<&'static str> {
    Self::ALL.iter().map(|m| m.as_str()).collect()
  }

  /// The per-architecture targets this mode is assembled from, in build order.
  pub fn constituents(&self) -> &'static [TargetName] {
    match self {
      Self::MacosX64 => &[TargetName::MacosX64],
      Self::MacosArm64 => &[TargetName::MacosArm64],
      Self::MacosUniversal => &[TargetName::MacosArm64, TargetName::MacosX64],
      Self::IphoneosArm64 => &[TargetName::IphoneosArm64],
      Self::IphonesimulatorX64 => &[TargetName::IphonesimulatorX64],
      Self::IphonesimulatorArm64 => &[TargetName::IphonesimulatorArm64],
      Self::IphoneallUniversal => &[
        TargetName::IphoneosArm64,
        TargetName::IphonesimulatorX64,
        TargetName::IphonesimulatorArm64,
      ],
    }
  }

  pub fn is_universal(&self) -> bool {
    matches!(self, Self::MacosUniversal | Self::IphoneallUniversal)
  }

  /// File name (without directory) of the archive produced for this mode.
  pub fn archive_file_name(&self) -> String {
    format!("angle-{}.tar.gz", self.as_str())
  }
}

impl fmt::Display for OutputArtifactMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for OutputArtifactMode {
  type Err = ParseModeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|m| m.as_str() == s)
      .ok_or_else(|| ParseModeError(s.to_string()))
  }
}

/// One of the five single-architecture build configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetName {
  MacosArm64,
  MacosX64,
  IphoneosArm64,
  IphonesimulatorX64,
  IphonesimulatorArm64,
}

impl TargetName {
  pub fn platform(&self) -> Platform {
    match self {
      Self::MacosArm64 => Platform::new(TargetOs::Mac, Cpu::Arm64),
      Self::MacosX64 => Platform::new(TargetOs::Mac, Cpu::X64),
      Self::IphoneosArm64 => Platform::new(TargetOs::IphoneOs, Cpu::Arm64),
      Self::IphonesimulatorX64 => Platform::new(TargetOs::IphoneSimulator, Cpu::X64),
      Self::IphonesimulatorArm64 => Platform::new(TargetOs::IphoneSimulator, Cpu::Arm64),
    }
  }

  /// Name of the `out/` subdirectory this target compiles into.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::MacosArm64 => "macos-arm64",
      Self::MacosX64 => "macos-x64",
      Self::IphoneosArm64 => "iphoneos-arm64",
      Self::IphonesimulatorX64 => "iphonesimulator-x64",
      Self::IphonesimulatorArm64 => "iphonesimulator-arm64",
    }
  }

  /// The fixed `gn` argument template for this target.
  pub fn gn_args(&self) -> Vec<String> {
    let platform = self.platform();
    let mut args: Vec<String> = COMMON_GN_ARGS.iter().map(|a| a.to_string()).collect();

    args.push(format!("target_cpu=\"{}\"", platform.cpu.as_str()));
    args.push(format!("target_os=\"{}\"", platform.os.gn_os()));

    if platform.os.is_simulator() {
      args.push("target_environment=\"simulator\"".to_string());
    }
    if platform.os.is_ios() {
      args.push("ios_enable_code_signing=false".to_string());
    }

    args
  }
}

impl fmt::Display for TargetName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// A single configuration handed to the build driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildTarget {
  pub name: TargetName,
  pub gn_args: Vec<String>,
}

impl BuildTarget {
  pub fn new(name: TargetName) -> Self {
    Self {
      gn_args: name.gn_args(),
      name,
    }
  }

  /// The `--args=` value for `gn gen`.
  pub fn gn_args_string(&self) -> String {
    self.gn_args.join(" ")
  }
}

/// Plan the ordered, duplicate-free build targets for `mode`.
pub fn plan(mode: OutputArtifactMode) -> Vec<BuildTarget> {
  let mut targets: Vec<BuildTarget> = Vec::new();
  for name in mode.constituents() {
    if !targets.iter().any(|t| t.name == *name) {
      targets.push(BuildTarget::new(*name));
    }
  }
  targets
}
