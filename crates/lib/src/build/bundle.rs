//! Framework bundle metadata fixups.

use std::path::Path;

use tracing::info;

use crate::consts::BUNDLE_SHORT_VERSION;
use crate::exec::{CommandRunner, ExecError, Invocation};

/// Inject `CFBundleShortVersionString` into a framework's Info.plist.
///
/// ANGLE's generated frameworks omit the key, and App Store validation
/// rejects bundles without it.
pub fn patch_short_version(runner: &dyn CommandRunner, framework: &Path) -> Result<(), ExecError> {
  let plist = framework.join("Info.plist");
  info!(plist = %plist.display(), version = BUNDLE_SHORT_VERSION, "patching bundle short version");

  runner.run(
    &Invocation::new("plutil")
      .args(["-replace", "CFBundleShortVersionString", "-string", BUNDLE_SHORT_VERSION])
      .path_arg(plist),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::RecordingRunner;

  #[test]
  fn patch_targets_info_plist() {
    let runner = RecordingRunner::new();
    patch_short_version(&runner, Path::new("/out/iphoneos-arm64/libEGL.framework")).unwrap();

    assert_eq!(
      runner.command_lines(),
      ["plutil -replace CFBundleShortVersionString -string 1.0 /out/iphoneos-arm64/libEGL.framework/Info.plist"]
    );
  }
}
