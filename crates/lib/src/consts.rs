//! Fixed names, URLs and defaults shared across the crate.

/// Name of the workspace folder created under the storage base directory.
pub const STORAGE_FOLDER_NAME: &str = ".angle-builder";

/// Environment variable overriding the storage base directory.
pub const STORAGE_ENV_VAR: &str = "ANGLE_BUILDER_STORAGE";

pub const ANGLE_REPO_URL: &str = "https://github.com/google/angle";
pub const DEPOT_TOOLS_REPO_URL: &str = "https://chromium.googlesource.com/chromium/tools/depot_tools.git";
pub const DEPOT_TOOLS_DIR_NAME: &str = "depot_tools";

pub const DEFAULT_BRANCH: &str = "chromium/6261";

/// Default artifact folder, relative to the current working directory.
pub const DEFAULT_ARTIFACT_DIR: &str = "angle-artifacts";

/// The two entry-point libraries produced for every target.
pub const LIBRARIES: [&str; 2] = ["libEGL", "libGLESv2"];

/// Value injected as `CFBundleShortVersionString` into framework Info.plist files.
pub const BUNDLE_SHORT_VERSION: &str = "1.0";
